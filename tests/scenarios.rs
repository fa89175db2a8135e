//! End-to-end timetabling cycles with the `good_lp` backend.

use std::collections::HashMap;

use u_timetable::export::{JsonSink, ReportSink};
use u_timetable::milp::LessonModelBuilder;
use u_timetable::models::{Block, Day, ScheduleReport, Snapshot, SnapshotRecords, TimeSlot};
use u_timetable::repository::MemoryRepository;
use u_timetable::scheduler::{ScheduleExtractor, ScheduleStore, TimetableScheduler};
use u_timetable::solver::{GoodLpSolver, MilpSolver};
use u_timetable::validation::ValidationErrorKind;
use u_timetable::TimetableError;

fn params(
    records: SnapshotRecords,
    c1: i64,
    c2: i64,
    c3: i64,
    c4: i64,
    c5: i64,
) -> SnapshotRecords {
    records
        .with_parameter("C1", c1)
        .with_parameter("C2", c2)
        .with_parameter("C3", c3)
        .with_parameter("C4", c4)
        .with_parameter("C5", c5)
}

fn scenario_a() -> SnapshotRecords {
    params(
        SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_group("G1", 20)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_curriculum("G1", "U1")
            .with_professor_eligibility("P1", "G1 U1"),
        2,
        15,
        3,
        0,
        1,
    )
}

fn run(records: SnapshotRecords) -> Result<ScheduleReport, TimetableError> {
    TimetableScheduler::new().run(&MemoryRepository::from_records(records))
}

/// Every booking of a report as (slot, group, classroom, professor, course-unit).
fn lessons(report: &ScheduleReport) -> Vec<(TimeSlot, String, String, String, String)> {
    let mut out = Vec::new();
    for table in &report.groups {
        for slot in TimeSlot::all() {
            for b in table.grid.cell(slot) {
                out.push((
                    slot,
                    table.entity_id.clone(),
                    b.classroom.clone(),
                    b.counterpart.clone(),
                    b.course_unit.clone(),
                ));
            }
        }
    }
    out
}

#[test]
fn scenario_a_two_lessons_in_r1_with_p1() {
    let report = run(scenario_a()).unwrap();
    let all = lessons(&report);
    assert_eq!(all.len(), 2);
    assert!(all
        .iter()
        .all(|(_, g, r, p, u)| g == "G1" && r == "R1" && p == "P1" && u == "U1"));

    // Without the same-day rule, Monday's first two blocks win.
    let slots: Vec<TimeSlot> = all.iter().map(|l| l.0).collect();
    assert_eq!(
        slots,
        vec![
            TimeSlot::new(Day::Mon, Block::AM1),
            TimeSlot::new(Day::Mon, Block::AM2)
        ]
    );
    assert_eq!(report.professor("P1").unwrap().grid.booking_count(), 2);
}

#[test]
fn scenario_a_same_day_rule_spreads_lessons() {
    let mut records = scenario_a();
    records.parameters.retain(|p| p.name != "C4");
    let report = run(records.with_parameter("C4", 1)).unwrap();
    let slots: Vec<TimeSlot> = lessons(&report).iter().map(|l| l.0).collect();
    assert_eq!(
        slots,
        vec![
            TimeSlot::new(Day::Mon, Block::AM1),
            TimeSlot::new(Day::Tue, Block::AM1)
        ]
    );
}

fn scenario_b() -> SnapshotRecords {
    params(
        SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_group("BIG", 30)
            .with_group("G2", 20)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_curriculum("BIG", "U1")
            .with_curriculum("G2", "U1")
            .with_professor_eligibility("P1", "BIG U1;G2 U1"),
        2,
        15,
        3,
        1,
        1,
    )
}

#[test]
fn scenario_b_oversized_group_is_omitted() {
    let report = run(scenario_b()).unwrap();
    assert_eq!(report.group("BIG").unwrap().grid.booking_count(), 0);
    assert_eq!(report.group("G2").unwrap().grid.booking_count(), 2);
}

#[test]
fn scenario_b_curriculum_floor_makes_it_infeasible() {
    let err = run(scenario_b().with_parameter("C6", 1)).unwrap_err();
    assert!(err.is_infeasible(), "unexpected error: {err}");
    assert!(!err.is_timeout());
}

#[test]
fn scenario_b_without_capacity_rule_uses_small_room() {
    let mut records = scenario_b();
    records.parameters.retain(|p| p.name != "C5");
    let report = run(records.with_parameter("C5", 0)).unwrap();
    // Only de-preferred by the objective, not excluded.
    assert_eq!(report.group("BIG").unwrap().grid.booking_count(), 2);
}

#[test]
fn scenario_c_professor_blackout_respected() {
    let records = scenario_a().with_professor_blackout("P1", "Mon AM1 AM2");
    let report = run(records).unwrap();
    let grid = &report.professor("P1").unwrap().grid;
    assert!(grid.cell(TimeSlot::new(Day::Mon, Block::AM1)).is_empty());
    assert!(grid.cell(TimeSlot::new(Day::Mon, Block::AM2)).is_empty());
    assert_eq!(grid.booking_count(), 2);
    assert_eq!(grid.cell_text(TimeSlot::new(Day::Mon, Block::PM1)), "U1-R1-G1");
}

fn shared_professor(c2: i64, c3: i64) -> SnapshotRecords {
    params(
        SnapshotRecords::new()
            .with_classroom("R1", 25)
            .with_group("G1", 20)
            .with_group("G2", 20)
            .with_professor("P1")
            .with_course_unit("U1")
            .with_curriculum("G1", "U1")
            .with_curriculum("G2", "U1")
            .with_professor_eligibility("P1", "G1 U1;G2 U1"),
        2,
        c2,
        c3,
        0,
        1,
    )
}

#[test]
fn weekly_professor_cap_cuts_schedule() {
    let uncapped = run(shared_professor(15, 4)).unwrap();
    assert_eq!(uncapped.lesson_count(), 4);

    let report = run(shared_professor(1, 4)).unwrap();
    let all = lessons(&report);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].0, TimeSlot::new(Day::Mon, Block::AM1));
    assert_eq!(report.professor("P1").unwrap().grid.booking_count(), 1);
}

#[test]
fn daily_professor_cap_spreads_across_days() {
    let report = run(shared_professor(15, 1)).unwrap();
    let slots: Vec<TimeSlot> = lessons(&report).iter().map(|l| l.0).collect();
    assert_eq!(slots.len(), 4);

    let mut days: Vec<Day> = slots.iter().map(|s| s.day).collect();
    days.sort();
    assert_eq!(days, vec![Day::Mon, Day::Tue, Day::Wed, Day::Thu]);
    assert!(slots.iter().all(|s| s.block == Block::AM1));
}

fn campus() -> SnapshotRecords {
    params(
        SnapshotRecords::new()
            .with_classroom("R1", 30)
            .with_classroom("LAB", 15)
            .with_group("G1", 25)
            .with_group("G2", 12)
            .with_professor("P1")
            .with_professor("P2")
            .with_course_unit("U1")
            .with_course_unit("U2")
            .with_course_unit("U3")
            .with_room_eligibility("U3", "LAB")
            .with_curriculum("G1", "U1 U2")
            .with_curriculum("G2", "U1;U3")
            .with_professor_eligibility("P1", "G1 U1;G2 U1")
            .with_professor_eligibility("P2", "G1 U2;G2 U3")
            .with_group_blackout("G2", "Mon AM1 AM2")
            .with_professor_blackout("P2", "Tue AM1;Wed PM2"),
        2,
        5,
        2,
        1,
        1,
    )
}

#[test]
fn campus_solution_satisfies_every_rule() {
    let records = campus();
    let snapshot = Snapshot::from_records(&records).unwrap();
    let model = LessonModelBuilder::new(&snapshot).build().unwrap();
    let (assignment, _) = GoodLpSolver::new()
        .solve(&model)
        .unwrap()
        .into_solution()
        .unwrap();
    assert!(model.violations(&assignment).unwrap().is_empty());

    let report = ScheduleExtractor::new(&snapshot).extract(&assignment).unwrap();
    assert!(!report.has_conflicts());
    let all = lessons(&report);
    assert!(!all.is_empty());

    let mut room_slot: HashMap<(TimeSlot, &str), usize> = HashMap::new();
    let mut per_unit: HashMap<(&str, &str), usize> = HashMap::new();
    let mut per_prof: HashMap<&str, usize> = HashMap::new();
    let mut per_prof_day: HashMap<(&str, Day), usize> = HashMap::new();
    let mut per_unit_day: HashMap<(&str, &str, Day), usize> = HashMap::new();

    for (slot, group, room, prof, unit) in &all {
        let (group, room, prof, unit) =
            (group.as_str(), room.as_str(), prof.as_str(), unit.as_str());
        *room_slot.entry((*slot, room)).or_default() += 1;
        *per_unit.entry((group, unit)).or_default() += 1;
        *per_prof.entry(prof).or_default() += 1;
        *per_prof_day.entry((prof, slot.day)).or_default() += 1;
        *per_unit_day.entry((group, unit, slot.day)).or_default() += 1;

        let eligible = matches!(
            (prof, group, unit),
            ("P1", "G1", "U1") | ("P1", "G2", "U1") | ("P2", "G1", "U2") | ("P2", "G2", "U3")
        );
        assert!(eligible, "ineligible lesson {prof} {group} {unit}");
        if unit == "U3" {
            assert_eq!(room, "LAB");
        }
        if group == "G1" {
            assert_eq!(room, "R1", "G1 does not fit LAB");
        }
        if group == "G2" {
            assert_ne!(*slot, TimeSlot::new(Day::Mon, Block::AM1));
            assert_ne!(*slot, TimeSlot::new(Day::Mon, Block::AM2));
        }
        if prof == "P2" {
            assert_ne!(*slot, TimeSlot::new(Day::Tue, Block::AM1));
            assert_ne!(*slot, TimeSlot::new(Day::Wed, Block::PM2));
        }
    }

    assert!(room_slot.values().all(|&n| n <= 1));
    assert!(per_unit.values().all(|&n| n <= 2));
    assert!(per_prof.values().all(|&n| n <= 5));
    assert!(per_prof_day.values().all(|&n| n <= 2));
    assert!(per_unit_day.values().all(|&n| n <= 1));
}

#[test]
fn malformed_encoding_aborts_cycle() {
    let err = run(campus().with_group_blackout("G1", "Sun AM1")).unwrap_err();
    match err {
        TimetableError::MalformedEncoding { entity, field, .. } => {
            assert_eq!(entity, "G1");
            assert_eq!(field, "blackout");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn validation_errors_are_collected() {
    let err = run(campus().with_group("G1", 10).with_classroom("R9", 0)).unwrap_err();
    match err {
        TimetableError::Validation(errors) => {
            assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
            assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::NonPositiveSize));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_parameter_aborts_cycle() {
    let mut records = campus();
    records.parameters.retain(|p| p.name != "C3");
    let err = run(records).unwrap_err();
    assert!(matches!(err, TimetableError::MissingParameter(ref n) if n == "C3"));
}

#[test]
fn publish_then_export() {
    let repo = MemoryRepository::from_records(scenario_a());
    let store = ScheduleStore::new();
    let scheduler = TimetableScheduler::new();

    let first = scheduler.run_and_publish(&repo, &store).unwrap();
    repo.update(|r| {
        r.professor_blackouts.push(u_timetable::models::BlackoutRecord {
            owner: "P1".into(),
            slots: "Mon AM1".into(),
        })
    });
    let second = scheduler.run_and_publish(&repo, &store).unwrap();

    assert_eq!(first.version, 1);
    assert_eq!(second.version, 2);
    assert_ne!(first.report, second.report);
    assert_eq!(store.latest().unwrap().version, 2);

    let dir = tempfile::tempdir().unwrap();
    let files = JsonSink::new(dir.path()).write(&second.report).unwrap();
    let groups: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(groups[0]["entity_id"], "G1");
    assert_eq!(groups[0]["rows"][2][1], "U1-R1-P1");
}
