use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleRules;
use crate::error::Result;
use crate::schedule::{Day, Roster, ScheduleGrid, ShiftType, Shortfall};

/// One shift of one day, as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub shift: ShiftType,
    pub employees: Vec<String>,
    pub understaffed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub day: Day,
    pub shifts: Vec<ShiftReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeReport {
    pub name: String,
    pub days_worked: usize,
    pub assignments: BTreeMap<Day, Option<ShiftType>>,
}

/// Full result of one run, with days and shifts in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub generated_at: DateTime<Utc>,
    pub rules: ScheduleRules,
    pub days: Vec<DayReport>,
    pub employees: Vec<EmployeeReport>,
    pub shortfalls: Vec<Shortfall>,
}

impl ScheduleReport {
    pub fn new(grid: &ScheduleGrid, roster: &Roster, rules: &ScheduleRules) -> Self {
        let days = rules
            .days
            .iter()
            .map(|&day| DayReport {
                day,
                shifts: rules
                    .shifts
                    .iter()
                    .map(|&shift| {
                        let employees = grid.staff(day, shift).to_vec();
                        ShiftReport {
                            shift,
                            understaffed: employees.len() < rules.min_staff_per_shift,
                            employees,
                        }
                    })
                    .collect(),
            })
            .collect();

        let employees = roster
            .employees()
            .iter()
            .map(|e| EmployeeReport {
                name: e.name().to_string(),
                days_worked: e.days_worked(),
                assignments: rules.days.iter().map(|&day| (day, e.assignment(day))).collect(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            rules: rules.clone(),
            days,
            employees,
            shortfalls: grid.shortfalls(&rules.days, &rules.shifts, rules.min_staff_per_shift),
        }
    }
}

/// Writes `day,shift,position,employee` rows; empty cells get one row with
/// a blank employee so every slot appears.
pub fn write_grid_csv<W: Write>(
    grid: &ScheduleGrid,
    days: &[Day],
    shifts: &[ShiftType],
    out: W,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(["day", "shift", "position", "employee"])?;
    for &day in days {
        for &shift in shifts {
            let staff = grid.staff(day, shift);
            if staff.is_empty() {
                wtr.write_record([day.as_str(), shift.as_str(), "", ""])?;
            }
            for (position, name) in staff.iter().enumerate() {
                let position = (position + 1).to_string();
                wtr.write_record([day.as_str(), shift.as_str(), position.as_str(), name.as_str()])?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_grid_csv(
    grid: &ScheduleGrid,
    days: &[Day],
    shifts: &[ShiftType],
    path: &Path,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_grid_csv(grid, days, shifts, file)
}

pub fn export_report_json(report: &ScheduleReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}
