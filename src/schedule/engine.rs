//! Two-pass weekly shift assignment.
//!
//! 1. Preference pass: day by day, each employee in roster order takes the
//!    highest ranked shift whose cell is still below the soft cap.
//! 2. Repair pass: day by day, shift by shift, cells below the staffing
//!    target draft the first employee (roster order) who is under the weekly
//!    cap and not yet working that day, ignoring preferences.
//!
//! Both passes are deterministic for a fixed roster. Nothing placed is ever
//! moved, so a cell can end below target; that is reported through
//! [`ScheduleGrid::shortfalls`], not as an error.

use tracing::{debug, info, warn};

use super::roster::Roster;
use super::types::{Day, ScheduleGrid, ShiftType, Shortfall};
use crate::config::ScheduleRules;

/// Runs the assignment passes for one week under a fixed set of rules.
#[derive(Debug, Clone, Default)]
pub struct AssignmentEngine {
    rules: ScheduleRules,
}

impl AssignmentEngine {
    pub fn new(rules: ScheduleRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Assigns the whole week and returns the grid. `roster` keeps the
    /// per-employee day counts and assignments.
    pub fn run(&self, roster: &mut Roster) -> ScheduleGrid {
        let mut grid = ScheduleGrid::new();

        let placed = preference_pass(roster, &mut grid, &self.rules);
        info!(placed, employees = roster.len(), "preference pass finished");

        let drafted = repair_pass(roster, &mut grid, &self.rules);
        info!(drafted, "repair pass finished");

        let shortfalls = self.shortfalls(&grid);
        for s in &shortfalls {
            warn!(
                day = %s.day,
                shift = %s.shift,
                assigned = s.assigned,
                required = s.required,
                "shift under-staffed"
            );
        }
        grid
    }

    /// Cells of `grid` below the staffing target, in processing order.
    pub fn shortfalls(&self, grid: &ScheduleGrid) -> Vec<Shortfall> {
        grid.shortfalls(&self.rules.days, &self.rules.shifts, self.rules.min_staff_per_shift)
    }
}

/// Preference pass. Returns the number of placements made.
pub fn preference_pass(
    roster: &mut Roster,
    grid: &mut ScheduleGrid,
    rules: &ScheduleRules,
) -> usize {
    let mut placed = 0;
    for &day in &rules.days {
        for index in 0..roster.len() {
            if roster.days_worked(index) >= rules.weekly_day_cap {
                continue;
            }
            let employee = roster.employees()[index].name();
            match first_open_choice(roster.ranking(index, day), grid, day, rules.soft_shift_cap) {
                Some(shift) => {
                    debug!(employee, %day, %shift, "assigned by preference");
                    roster.record_assignment(grid, index, day, shift);
                    placed += 1;
                }
                None => {
                    debug!(employee, %day, "every ranked shift at soft cap");
                }
            }
        }
    }
    placed
}

fn first_open_choice(
    ranking: &[ShiftType],
    grid: &ScheduleGrid,
    day: Day,
    soft_cap: usize,
) -> Option<ShiftType> {
    ranking
        .iter()
        .copied()
        .find(|&shift| grid.headcount(day, shift) < soft_cap)
}

/// Repair pass. Returns the number of employees drafted.
///
/// One roster scan per missing person; the first scan that finds nobody
/// ends the attempt for that cell.
pub fn repair_pass(roster: &mut Roster, grid: &mut ScheduleGrid, rules: &ScheduleRules) -> usize {
    let mut drafted = 0;
    for &day in &rules.days {
        for &shift in &rules.shifts {
            while grid.headcount(day, shift) < rules.min_staff_per_shift {
                let Some(index) = first_available(roster, day, rules.weekly_day_cap) else {
                    debug!(%day, %shift, "no eligible employee left");
                    break;
                };
                let employee = roster.employees()[index].name();
                debug!(employee, %day, %shift, "drafted to meet minimum");
                roster.record_assignment(grid, index, day, shift);
                drafted += 1;
            }
        }
    }
    drafted
}

fn first_available(roster: &Roster, day: Day, weekly_cap: usize) -> Option<usize> {
    (0..roster.len()).find(|&index| {
        roster.days_worked(index) < weekly_cap && roster.assignment(index, day).is_none()
    })
}

/// Convenience wrapper for a single run under `rules`.
pub fn assign_week(roster: &mut Roster, rules: &ScheduleRules) -> ScheduleGrid {
    AssignmentEngine::new(rules.clone()).run(roster)
}
