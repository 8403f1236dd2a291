use shift_roster::config::ScheduleRules;
use shift_roster::display::render_schedule;
use shift_roster::export::{write_grid_csv, ScheduleReport};
use shift_roster::parser::{build_roster, demo_roster, load_roster_file};
use shift_roster::schedule::{AssignmentEngine, Day, RandomPreferences, ShiftType, TaxonomyOrder};
use shift_roster::RosterError;

#[test]
fn demo_roster_week_respects_caps() {
    let rules = ScheduleRules::default();
    let mut roster = build_roster(&demo_roster(), &rules, RandomPreferences::seeded(2024)).unwrap();
    let engine = AssignmentEngine::new(rules.clone());
    let grid = engine.run(&mut roster);

    for employee in roster.employees() {
        assert!(employee.days_worked() <= 5);
        assert_eq!(employee.worked_days().count(), employee.days_worked());
        for (day, shift) in employee.worked_days() {
            assert!(grid.staff(day, shift).iter().any(|n| n == employee.name()));
        }
    }
    assert_eq!(roster.len(), 10);
    assert!(grid.total_assignments() <= 50);
    // Pass 1 seats nine a day, so by Friday at most five person-days remain
    // for the twelve weekend slots.
    let weekend: usize = [Day::Saturday, Day::Sunday]
        .iter()
        .flat_map(|&day| ShiftType::ALL.map(|shift| grid.headcount(day, shift)))
        .sum();
    assert!(weekend <= 5);
    assert!(!engine.shortfalls(&grid).is_empty());
}

#[test]
fn roster_file_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staff.csv");
    std::fs::write(
        &path,
        "name,monday\n\
         Alice,Evening;Morning;Afternoon\n\
         Bob,Morning;Evening;Afternoon\n",
    )
    .unwrap();

    let rules = ScheduleRules::default();
    let entries = load_roster_file(&path).unwrap();
    let mut roster = build_roster(&entries, &rules, TaxonomyOrder).unwrap();
    let engine = AssignmentEngine::new(rules.clone());
    let grid = engine.run(&mut roster);

    // Two people: Monday has exactly the shifts they picked, the third is
    // empty and nothing can repair it.
    assert_eq!(grid.staff(Day::Monday, ShiftType::Morning), ["Bob"]);
    assert_eq!(grid.staff(Day::Monday, ShiftType::Evening), ["Alice"]);
    assert!(grid.staff(Day::Monday, ShiftType::Afternoon).is_empty());

    let text = render_schedule(&grid, &rules.days, &rules.shifts);
    assert!(text.contains("Afternoon : No staff assigned"));

    let report = ScheduleReport::new(&grid, &roster, &rules);
    assert_eq!(report.shortfalls, engine.shortfalls(&grid));

    let mut csv = Vec::new();
    write_grid_csv(&grid, &rules.days, &rules.shifts, &mut csv).unwrap();
    assert!(String::from_utf8(csv).unwrap().contains("Monday,Evening,1,Alice"));
}

#[test]
fn large_roster_meets_minimum_everywhere() {
    let rules = ScheduleRules::default();
    let names: Vec<String> = (0..12).map(|i| format!("Worker {}", i)).collect();
    let entries: Vec<_> = names.iter().map(shift_roster::parser::RosterEntry::new).collect();
    let mut roster = build_roster(&entries, &rules, RandomPreferences::seeded(77)).unwrap();
    let engine = AssignmentEngine::new(rules.clone());
    let grid = engine.run(&mut roster);

    // Pass 1 alone places up to 9 per day, so the first days always reach
    // two per shift.
    for shift in ShiftType::ALL {
        assert!(grid.headcount(Day::Monday, shift) >= 2);
    }
}

#[test]
fn single_employee_is_rejected_up_front() {
    let rules = ScheduleRules::default();
    let entries = vec![shift_roster::parser::RosterEntry::new("Solo")];
    let err = build_roster(&entries, &rules, TaxonomyOrder).unwrap_err();
    assert_eq!(err, RosterError::TooSmall { required: 2, actual: 1 });
}
