use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::schedule::{Day, Roster, ScheduleGrid, ShiftType, Shortfall};

const WIDTH: usize = 60;
const NO_STAFF: &str = "No staff assigned";

/// Names of a cell joined for display, or the no-staff marker.
pub fn format_staff(names: &[String]) -> String {
    if names.is_empty() {
        NO_STAFF.to_string()
    } else {
        names.join(", ")
    }
}

/// Renders the weekly grid in the given day and shift order.
pub fn render_schedule(grid: &ScheduleGrid, days: &[Day], shifts: &[ShiftType]) -> String {
    let rule = "=".repeat(WIDTH);
    let mut out = format!(
        "{rule}\n{:^width$}\n{rule}\n",
        "WEEKLY EMPLOYEE SCHEDULE",
        width = WIDTH
    );

    for &day in days {
        out.push_str(&format!("\n[ {} ]\n", day.as_str().to_uppercase()));
        for &shift in shifts {
            let staff = format_staff(grid.staff(day, shift));
            out.push_str(&format!("  {:10}: {}\n", shift.as_str(), staff));
        }
    }
    out.push_str(&format!("\n{rule}\n"));
    out
}

/// Days worked and shift per day for each employee, roster order.
pub fn render_employee_summary(roster: &Roster, days: &[Day]) -> String {
    let mut out = String::from("Employee summary:\n");
    for employee in roster.employees() {
        let week: Vec<String> = days
            .iter()
            .map(|&day| match employee.assignment(day) {
                Some(shift) => format!("{}={}", &day.as_str()[..3], shift),
                None => format!("{}=off", &day.as_str()[..3]),
            })
            .collect();
        out.push_str(&format!(
            "  {:12} {} day(s)  {}\n",
            employee.name(),
            employee.days_worked(),
            week.join(" ")
        ));
    }
    out
}

pub fn render_shortfalls(shortfalls: &[Shortfall]) -> String {
    if shortfalls.is_empty() {
        return "All shifts meet minimum staffing.\n".to_string();
    }
    let mut out = format!("Under-staffed shifts ({}):\n", shortfalls.len());
    for s in shortfalls {
        out.push_str(&format!(
            "  - {} {}: {} of {} (missing {})\n",
            s.day,
            s.shift,
            s.assigned,
            s.required,
            s.missing()
        ));
    }
    out
}

/// Prints the grid to stdout.
pub fn print_schedule(grid: &ScheduleGrid, days: &[Day], shifts: &[ShiftType]) {
    print!("{}", render_schedule(grid, days, shifts));
}

/// Writes the rendered report (grid followed by `extra` sections) to a file.
pub fn write_schedule_to_file(
    grid: &ScheduleGrid,
    days: &[Day],
    shifts: &[ShiftType],
    extra: &[String],
    path: &Path,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_schedule(grid, days, shifts).as_bytes())?;
    for section in extra {
        writeln!(file)?;
        file.write_all(section.as_bytes())?;
    }
    Ok(())
}
