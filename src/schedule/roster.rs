use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::preferences::PreferenceSource;
use super::types::{Day, ScheduleGrid, ShiftType};
use crate::config::ScheduleRules;
use crate::error::RosterError;

/// One employee, their per-day rankings and the assignment state of the
/// current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    name: String,
    preferences: BTreeMap<Day, Vec<ShiftType>>,
    days_worked: usize,
    current_schedule: BTreeMap<Day, Option<ShiftType>>,
}

impl Employee {
    fn new(name: String) -> Self {
        Self {
            name,
            preferences: BTreeMap::new(),
            days_worked: 0,
            current_schedule: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shifts for `day`, best first.
    pub fn ranking(&self, day: Day) -> &[ShiftType] {
        self.preferences.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days_worked(&self) -> usize {
        self.days_worked
    }

    /// Shift held on `day`; `None` while unassigned.
    pub fn assignment(&self, day: Day) -> Option<ShiftType> {
        self.current_schedule.get(&day).copied().flatten()
    }

    /// Days with an assignment, in week order.
    pub fn worked_days(&self) -> impl Iterator<Item = (Day, ShiftType)> + '_ {
        self.current_schedule
            .iter()
            .filter_map(|(day, shift)| shift.map(|s| (*day, s)))
    }
}

/// In-memory roster for a single run. Roster order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    employees: Vec<Employee>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds and validates a roster, generating every employee's rankings
    /// from `source`.
    ///
    /// Fails fast on an empty roster, blank or duplicate names, rankings that
    /// are not permutations of `rules.shifts`, and rosters too small to ever
    /// staff a single shift.
    pub fn build<I, S, P>(
        names: I,
        rules: &ScheduleRules,
        source: &mut P,
    ) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        P: PreferenceSource + ?Sized,
    {
        let mut roster = Roster::new();
        for name in names {
            roster.add_employee(name, rules, source)?;
        }
        if roster.is_empty() {
            return Err(RosterError::Empty);
        }
        if roster.len() < rules.min_staff_per_shift {
            return Err(RosterError::TooSmall {
                required: rules.min_staff_per_shift,
                actual: roster.len(),
            });
        }
        Ok(roster)
    }

    /// Creates an employee with one ranking per configured day, all days
    /// unassigned, and appends it in roster order.
    pub fn add_employee<S, P>(
        &mut self,
        name: S,
        rules: &ScheduleRules,
        source: &mut P,
    ) -> Result<(), RosterError>
    where
        S: Into<String>,
        P: PreferenceSource + ?Sized,
    {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(RosterError::BlankName {
                position: self.employees.len(),
            });
        }
        if self.get(&name).is_some() {
            return Err(RosterError::DuplicateName(name));
        }

        let mut employee = Employee::new(name);
        for &day in &rules.days {
            let ranking = source.rank(&employee.name, day, &rules.shifts);
            if !is_permutation_of(&ranking, &rules.shifts) {
                return Err(RosterError::InvalidRanking {
                    employee: employee.name,
                    day: day.to_string(),
                    ranking: ranking
                        .iter()
                        .map(ShiftType::as_str)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
            employee.preferences.insert(day, ranking);
            employee.current_schedule.insert(day, None);
        }
        self.employees.push(employee);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn get(&self, name: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.name == name)
    }

    pub fn ranking(&self, index: usize, day: Day) -> &[ShiftType] {
        self.employees[index].ranking(day)
    }

    pub fn days_worked(&self, index: usize) -> usize {
        self.employees[index].days_worked
    }

    pub fn assignment(&self, index: usize, day: Day) -> Option<ShiftType> {
        self.employees[index].assignment(day)
    }

    /// Appends the employee to the grid cell and updates their counters.
    /// Constraint checks are the caller's job.
    pub(crate) fn record_assignment(
        &mut self,
        grid: &mut ScheduleGrid,
        index: usize,
        day: Day,
        shift: ShiftType,
    ) {
        let employee = &mut self.employees[index];
        grid.push(day, shift, &employee.name);
        employee.days_worked += 1;
        employee.current_schedule.insert(day, Some(shift));
    }
}

fn is_permutation_of(ranking: &[ShiftType], shifts: &[ShiftType]) -> bool {
    if ranking.len() != shifts.len() {
        return false;
    }
    let mut seen = HashSet::new();
    ranking.iter().all(|s| shifts.contains(s) && seen.insert(*s))
}
