use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Day of the scheduling week. Variant order is the processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Day::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown day '{}'", wanted))
    }
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        Day::ALL[weekday.num_days_from_monday() as usize]
    }
}

/// Shift within a day. Variant order is the taxonomy order used for
/// ranking generation and for the repair pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftType {
    Morning,
    Afternoon,
    Evening,
}

impl ShiftType {
    pub const ALL: [ShiftType; 3] = [ShiftType::Morning, ShiftType::Afternoon, ShiftType::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Morning => "Morning",
            ShiftType::Afternoon => "Afternoon",
            ShiftType::Evening => "Evening",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShiftType::ALL
            .into_iter()
            .find(|shift| shift.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown shift '{}'", wanted))
    }
}

/// Finished (or in-progress) weekly grid: day -> shift -> names in
/// assignment order. Missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleGrid {
    cells: BTreeMap<Day, BTreeMap<ShiftType, Vec<String>>>,
}

impl ScheduleGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names assigned to a cell, in assignment order.
    pub fn staff(&self, day: Day, shift: ShiftType) -> &[String] {
        self.cells
            .get(&day)
            .and_then(|shifts| shifts.get(&shift))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn headcount(&self, day: Day, shift: ShiftType) -> usize {
        self.staff(day, shift).len()
    }

    pub(crate) fn push(&mut self, day: Day, shift: ShiftType, name: &str) {
        self.cells
            .entry(day)
            .or_default()
            .entry(shift)
            .or_default()
            .push(name.to_string());
    }

    /// Which shift `name` holds on `day`, if any.
    pub fn shift_of(&self, day: Day, name: &str) -> Option<ShiftType> {
        self.cells.get(&day).and_then(|shifts| {
            shifts
                .iter()
                .find(|(_, names)| names.iter().any(|n| n == name))
                .map(|(shift, _)| *shift)
        })
    }

    /// Total number of (day, shift, employee) placements.
    pub fn total_assignments(&self) -> usize {
        self.cells
            .values()
            .flat_map(|shifts| shifts.values())
            .map(Vec::len)
            .sum()
    }

    /// Cells holding fewer than `min_staff` names, in the given day and
    /// shift order.
    pub fn shortfalls(
        &self,
        days: &[Day],
        shifts: &[ShiftType],
        min_staff: usize,
    ) -> Vec<Shortfall> {
        let mut result = Vec::new();
        for &day in days {
            for &shift in shifts {
                let assigned = self.headcount(day, shift);
                if assigned < min_staff {
                    result.push(Shortfall {
                        day,
                        shift,
                        assigned,
                        required: min_staff,
                    });
                }
            }
        }
        result
    }
}

/// A cell that ended the run below the minimum staffing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub day: Day,
    pub shift: ShiftType,
    pub assigned: usize,
    pub required: usize,
}

impl Shortfall {
    pub fn missing(&self) -> usize {
        self.required.saturating_sub(self.assigned)
    }
}
