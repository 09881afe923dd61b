#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use faction::{
    plan, GuardId, NightWindow, PostId, SchedError, ScheduleRequest, ShiftLengths,
    UnavailabilityWindow,
};
use std::collections::HashMap;

fn dt(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn base_request(start: NaiveDateTime, end: NaiveDateTime) -> ScheduleRequest {
    ScheduleRequest {
        schedule_start: start,
        schedule_end: end,
        guards: vec![GuardId::new("G1"), GuardId::new("G2")],
        posts: vec![PostId::new("P1")],
        unavailability: HashMap::new(),
        shift_lengths: ShiftLengths {
            day_shift_hours: 8.0,
            night_shift_hours: 8.0,
        },
        night_time_range: NightWindow::new(hm(22, 0), hm(6, 0)),
        max_consecutive_nights: 1,
    }
}

#[test]
fn one_day_horizon_alternates_guards() {
    let req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    let schedule = plan(req).unwrap();

    assert_eq!(schedule.assignments.len(), 3);
    assert_eq!(schedule.assignments[0].start, dt(1, 8, 0));
    assert_eq!(schedule.assignments[0].end, dt(1, 16, 0));
    assert_eq!(schedule.assignments[1].start, dt(1, 16, 0));
    assert_eq!(schedule.assignments[1].end, dt(2, 0, 0));
    assert_eq!(schedule.assignments[2].start, dt(2, 0, 0));
    assert_eq!(schedule.assignments[2].end, dt(2, 8, 0));

    let guards: Vec<&str> = schedule
        .assignments
        .iter()
        .map(|a| a.guard.as_str())
        .collect();
    assert_eq!(guards, vec!["G1", "G2", "G1"]);

    assert_eq!(schedule.metadata.total_assignments, 3);
    assert_eq!(schedule.metadata.unique_guards, 2);
    assert_eq!(schedule.metadata.unique_posts, 1);
    assert_eq!(schedule.metadata.schedule_duration_hours, 24.0);
}

#[test]
fn second_night_unfillable_for_single_guard() {
    let mut req = base_request(dt(1, 22, 0), dt(2, 6, 0));
    req.guards = vec![GuardId::new("G1")];
    req.shift_lengths.night_shift_hours = 4.0;

    // deux créneaux de nuit (22:00-02:00, 02:00-06:00), plafond à 1
    let err = plan(req).unwrap_err();
    match err {
        SchedError::UnfillableSlot { post, start, end } => {
            assert_eq!(post.as_str(), "P1");
            assert_eq!(start, dt(2, 2, 0));
            assert_eq!(end, dt(2, 6, 0));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fully_unavailable_guard_fails_first_slot() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.guards = vec![GuardId::new("G1")];
    req.unavailability.insert(
        GuardId::new("G1"),
        vec![UnavailabilityWindow::new(dt(1, 0, 0), dt(3, 0, 0)).unwrap()],
    );

    let err = plan(req).unwrap_err();
    match err {
        SchedError::UnfillableSlot { start, .. } => assert_eq!(start, dt(1, 8, 0)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn equal_horizon_rejected() {
    let req = base_request(dt(1, 8, 0), dt(1, 8, 0));
    assert!(matches!(plan(req), Err(SchedError::InvalidHorizon)));
}

#[test]
fn queues_are_independent_per_post() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.posts = vec![PostId::new("P1"), PostId::new("P2")];
    req.max_consecutive_nights = 3;
    // indisponibilités hors horizon : elles ne bloquent rien mais passent
    // par le même chemin de contrôle
    req.unavailability.insert(
        GuardId::new("G1"),
        vec![UnavailabilityWindow::new(dt(5, 0, 0), dt(6, 0, 0)).unwrap()],
    );
    req.unavailability.insert(
        GuardId::new("G2"),
        vec![UnavailabilityWindow::new(dt(7, 0, 0), dt(8, 0, 0)).unwrap()],
    );

    let schedule = plan(req).unwrap();
    assert_eq!(schedule.assignments.len(), 6);

    for post in ["P1", "P2"] {
        let guards: Vec<&str> = schedule
            .assignments
            .iter()
            .filter(|a| a.post.as_str() == post)
            .map(|a| a.guard.as_str())
            .collect();
        // chaque poste démarre sa propre rotation en tête de file
        assert_eq!(guards, vec!["G1", "G2", "G1"]);
    }
    assert_eq!(schedule.metadata.unique_posts, 2);
}

#[test]
fn same_request_same_schedule() {
    let req = base_request(dt(1, 8, 0), dt(3, 8, 0));
    let first = plan(req.clone()).unwrap();
    let second = plan(req).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_roster_rejected() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.guards.clear();
    assert!(matches!(plan(req), Err(SchedError::EmptyRoster)));

    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.posts.clear();
    assert!(matches!(plan(req), Err(SchedError::EmptyRoster)));
}

#[test]
fn duplicate_identifiers_rejected() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.guards.push(GuardId::new("G1"));
    assert!(matches!(plan(req), Err(SchedError::DuplicateGuard(g)) if g == "G1"));

    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.posts.push(PostId::new("P1"));
    assert!(matches!(plan(req), Err(SchedError::DuplicatePost(p)) if p == "P1"));
}

#[test]
fn unknown_guard_in_unavailability_rejected() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.unavailability.insert(
        GuardId::new("G9"),
        vec![UnavailabilityWindow::new(dt(1, 0, 0), dt(1, 4, 0)).unwrap()],
    );
    assert!(matches!(plan(req), Err(SchedError::UnknownGuard(g)) if g == "G9"));
}

#[test]
fn sub_second_shift_length_rejected() {
    // 0.0001 h ≈ 0,36 s : arrondie à zéro, la relève n'avancerait jamais
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.shift_lengths.day_shift_hours = 0.0001;
    assert!(matches!(plan(req), Err(SchedError::InvalidShiftLength(_))));

    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.shift_lengths.night_shift_hours = 1e-9;
    assert!(matches!(plan(req), Err(SchedError::InvalidShiftLength(_))));

    // la plus petite durée admise (une seconde) termine toujours
    let mut req = base_request(dt(1, 8, 0), dt(1, 8, 1));
    req.shift_lengths.day_shift_hours = 1.0 / 3600.0;
    let schedule = plan(req).unwrap();
    assert_eq!(schedule.assignments.len(), 60);
    assert_eq!(schedule.assignments.last().unwrap().end, dt(1, 8, 1));
}

#[test]
fn out_of_range_config_rejected() {
    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.shift_lengths.day_shift_hours = 0.0;
    assert!(matches!(plan(req), Err(SchedError::InvalidShiftLength(_))));

    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.shift_lengths.night_shift_hours = 25.0;
    assert!(matches!(plan(req), Err(SchedError::InvalidShiftLength(_))));

    let mut req = base_request(dt(1, 8, 0), dt(2, 8, 0));
    req.max_consecutive_nights = 0;
    assert!(matches!(plan(req), Err(SchedError::InvalidNightCap)));
}
