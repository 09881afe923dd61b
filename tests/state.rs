#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use faction::{
    GuardId, JsonStorage, NightWindow, Planner, PostId, SchedError, ScheduleRequest, ShiftLengths,
    SnapshotStore, UnavailabilityWindow,
};
use std::collections::{BTreeMap, HashMap};
use tempfile::tempdir;

fn dt(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn hm(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap()
}

fn one_slot_request() -> ScheduleRequest {
    // horizon d'exactement une relève de jour
    ScheduleRequest {
        schedule_start: dt(1, 8),
        schedule_end: dt(1, 16),
        guards: vec![GuardId::new("G1"), GuardId::new("G2")],
        posts: vec![PostId::new("P1")],
        unavailability: HashMap::new(),
        shift_lengths: ShiftLengths {
            day_shift_hours: 8.0,
            night_shift_hours: 8.0,
        },
        night_time_range: NightWindow::new(hm(22), hm(6)),
        max_consecutive_nights: 1,
    }
}

#[test]
fn snapshot_roundtrips_through_storage() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (schedule, state) = planner.solve_with_state(dt(1, 16)).unwrap();
    assert_eq!(schedule.assignments.len(), 1);

    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path().join("state.json")).unwrap();
    storage.save(&state).unwrap();
    let loaded = storage.load().unwrap();
    assert_eq!(loaded, state);

    assert_eq!(loaded.metadata.last_scheduled_end, dt(1, 16));
    assert_eq!(
        loaded.guard_queues.get(&PostId::new("P1")).unwrap(),
        &vec![GuardId::new("G2"), GuardId::new("G1")]
    );
}

#[test]
fn resume_continues_the_rotation() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (schedule, state) = planner.solve_with_state(dt(1, 16)).unwrap();
    assert_eq!(schedule.assignments[0].guard.as_str(), "G1");

    let resumed = Planner::resume(&state, dt(2, 0), HashMap::new(), false).unwrap();
    let next = resumed.solve().unwrap();
    assert_eq!(next.assignments.len(), 1);
    assert_eq!(next.assignments[0].start, dt(1, 16));
    // la file reprend là où elle s'était arrêtée : G2 en tête
    assert_eq!(next.assignments[0].guard.as_str(), "G2");
}

#[test]
fn resume_with_reset_restores_input_order() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (_, state) = planner.solve_with_state(dt(1, 16)).unwrap();

    let resumed = Planner::resume(&state, dt(2, 0), HashMap::new(), true).unwrap();
    let next = resumed.solve().unwrap();
    assert_eq!(next.assignments[0].guard.as_str(), "G1");
}

#[test]
fn resume_carries_night_counters() {
    // horizon d'une seule relève de nuit (22:00-02:00), plafond à 1
    let mut req = one_slot_request();
    req.schedule_start = dt(1, 22);
    req.schedule_end = dt(2, 2);
    req.shift_lengths.night_shift_hours = 4.0;
    let planner = Planner::new(req).unwrap();
    let (schedule, state) = planner.solve_with_state(dt(2, 2)).unwrap();
    assert_eq!(schedule.assignments[0].guard.as_str(), "G1");

    // la nuit suivante (02:00-06:00) revient à G2 ; G1 est au plafond
    let resumed = Planner::resume(&state, dt(2, 6), HashMap::new(), false).unwrap();
    let next = resumed.solve().unwrap();
    assert!(next.assignments[0].start.time() == hm(2));
    assert_eq!(next.assignments[0].guard.as_str(), "G2");

    // si G2 est indisponible, le créneau est impossible à pourvoir
    let mut extra = HashMap::new();
    extra.insert(
        GuardId::new("G2"),
        vec![UnavailabilityWindow::new(dt(2, 0), dt(3, 0)).unwrap()],
    );
    let resumed = Planner::resume(&state, dt(2, 6), extra, false).unwrap();
    assert!(matches!(
        resumed.solve(),
        Err(SchedError::UnfillableSlot { .. })
    ));
}

#[test]
fn resume_rejects_missing_queue() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (_, mut state) = planner.solve_with_state(dt(1, 16)).unwrap();
    state.guard_queues.clear();

    let err = Planner::resume(&state, dt(2, 0), HashMap::new(), false).unwrap_err();
    assert!(matches!(err, SchedError::IncompatibleState(_)));
}

#[test]
fn resume_rejects_tampered_queue() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (_, mut state) = planner.solve_with_state(dt(1, 16)).unwrap();
    state
        .guard_queues
        .insert(PostId::new("P1"), vec![GuardId::new("G1")]);

    let err = Planner::resume(&state, dt(2, 0), HashMap::new(), false).unwrap_err();
    assert!(matches!(err, SchedError::InvalidQueueOrder { .. }));
}

#[test]
fn snapshot_compatibility_ignores_order() {
    let planner = Planner::new(one_slot_request()).unwrap();
    let (_, state) = planner.solve_with_state(dt(1, 16)).unwrap();

    let same = [GuardId::new("G2"), GuardId::new("G1")];
    let posts = [PostId::new("P1")];
    assert!(state.compatible_with(&same, &posts));

    let other = [GuardId::new("G1"), GuardId::new("G3")];
    assert!(!state.compatible_with(&other, &posts));
}

#[test]
fn custom_queue_orders_shift_the_head() {
    let mut orders = BTreeMap::new();
    orders.insert(
        PostId::new("P1"),
        vec![GuardId::new("G2"), GuardId::new("G1")],
    );
    let planner = Planner::with_queue_orders(one_slot_request(), orders).unwrap();
    let schedule = planner.solve().unwrap();
    assert_eq!(schedule.assignments[0].guard.as_str(), "G2");
}

#[test]
fn custom_queue_orders_must_cover_the_roster() {
    let mut orders = BTreeMap::new();
    orders.insert(PostId::new("P1"), vec![GuardId::new("G2")]);
    let err = Planner::with_queue_orders(one_slot_request(), orders).unwrap_err();
    assert!(matches!(err, SchedError::InvalidQueueOrder { .. }));

    let mut orders = BTreeMap::new();
    orders.insert(
        PostId::new("P9"),
        vec![GuardId::new("G1"), GuardId::new("G2")],
    );
    let err = Planner::with_queue_orders(one_slot_request(), orders).unwrap_err();
    assert!(matches!(err, SchedError::InvalidQueueOrder { .. }));
}
