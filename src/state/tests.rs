use super::*;
use crate::presence::{EntityId, PresenceCode, PresenceSnapshot, PresenceTuple};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

fn offline() -> PresenceTuple {
    PresenceTuple::offline()
}

fn in_game(place: &str, server: Option<&str>) -> PresenceTuple {
    PresenceTuple::new(
        PresenceCode::InGame,
        Some(place.to_string()),
        server.map(|s| s.to_string()),
    )
}

fn web() -> PresenceTuple {
    PresenceTuple::new(PresenceCode::OnlineWeb, None, None)
}

fn snap(tuple: PresenceTuple, secs: i64) -> PresenceSnapshot {
    PresenceSnapshot::new(tuple, at(secs))
}

fn new_state() -> EntityState {
    EntityState::new(EntityId(42), "builderman")
}

#[test]
fn test_first_observation_sets_baseline() {
    let mut state = new_state();
    assert!(state.is_untracked());

    let diff = state.observe(&snap(offline(), 0));

    assert!(diff.first_observation);
    assert!(diff.changed);
    assert_eq!(diff.previous, offline());
    assert_eq!(diff.current, offline());
    assert_eq!(diff.duration_in_previous_state, 0.0);
    assert_eq!(diff.durations, CumulativeDurations::default());
    assert_eq!(state.entered_at(), Some(at(0)));
    assert_eq!(state.last_observed_at(), Some(at(0)));
    assert_eq!(state.observations(), 1);
}

#[test]
fn test_stable_input_never_changes() {
    let mut state = new_state();
    state.observe(&snap(in_game("123", Some("srv")), 0));

    for i in 1..=10 {
        let diff = state.observe(&snap(in_game("123", Some("srv")), i * 5));
        assert!(!diff.changed);
        assert!(!diff.first_observation);
        assert_eq!(diff.duration_in_previous_state, 0.0);
        assert_eq!(state.entered_at(), Some(at(0)));
    }
}

#[test]
fn test_elapsed_credited_to_previous_state() {
    let mut state = new_state();
    state.observe(&snap(offline(), 0));
    state.observe(&snap(offline(), 10));
    // Went online at 10; the 10..15 interval is online time
    state.observe(&snap(web(), 15));
    let diff = state.observe(&snap(web(), 20));

    assert_eq!(diff.durations.get(DurationClass::Offline), 15.0);
    assert_eq!(diff.durations.get(DurationClass::Online), 5.0);
    assert_eq!(diff.durations.get(DurationClass::Active), 0.0);
}

#[test]
fn test_in_game_counts_online_and_active() {
    let mut state = new_state();
    state.observe(&snap(in_game("1", None), 0));
    let diff = state.observe(&snap(in_game("1", None), 30));

    assert_eq!(diff.durations.get(DurationClass::Online), 30.0);
    assert_eq!(diff.durations.get(DurationClass::Active), 30.0);
    assert_eq!(diff.durations.get(DurationClass::Offline), 0.0);
}

#[test]
fn test_invisible_counts_as_offline() {
    let mut state = new_state();
    let invisible = PresenceTuple::new(PresenceCode::Invisible, None, None);
    state.observe(&snap(invisible.clone(), 0));
    let diff = state.observe(&snap(invisible, 12));

    assert_eq!(diff.durations.get(DurationClass::Offline), 12.0);
    assert_eq!(diff.durations.get(DurationClass::Online), 0.0);
}

#[test]
fn test_change_records_duration_in_previous_state() {
    let mut state = new_state();
    state.observe(&snap(offline(), 0));
    state.observe(&snap(offline(), 5));
    let diff = state.observe(&snap(in_game("123", None), 25));

    assert!(diff.changed);
    assert_eq!(diff.previous, offline());
    assert_eq!(diff.current, in_game("123", None));
    assert_eq!(diff.duration_in_previous_state, 25.0);
    assert_eq!(state.entered_at(), Some(at(25)));
    assert_eq!(state.tuple(), &in_game("123", None));
}

#[test]
fn test_sub_context_change_is_a_change() {
    let mut state = new_state();
    state.observe(&snap(in_game("123", Some("a")), 0));
    let diff = state.observe(&snap(in_game("123", Some("b")), 5));
    assert!(diff.changed);
}

#[test]
fn test_conservation_of_tracked_time() {
    let mut state = new_state();
    let sequence = [
        (offline(), 0),
        (web(), 7),
        (in_game("1", None), 13),
        (in_game("2", Some("x")), 20),
        (offline(), 41),
        (PresenceTuple::new(PresenceCode::InStudio, Some("9".into()), None), 50),
        (offline(), 64),
    ];

    let mut last = None;
    for (tuple, secs) in sequence {
        last = Some(state.observe(&snap(tuple, secs)));
    }

    let durations = last.unwrap().durations;
    assert!((durations.tracked() - 64.0).abs() < 1e-9);
    assert!(durations.get(DurationClass::Active) <= durations.get(DurationClass::Online));
}

#[test]
fn test_clock_going_backwards_is_ignored() {
    let mut state = new_state();
    state.observe(&snap(web(), 10));
    let diff = state.observe(&snap(offline(), 4));

    assert!(diff.changed);
    assert_eq!(diff.duration_in_previous_state, 0.0);
    assert_eq!(diff.durations.tracked(), 0.0);
    // Neither timestamp rewinds
    assert_eq!(state.entered_at(), Some(at(10)));
    assert_eq!(state.last_observed_at(), Some(at(10)));
}

#[test]
fn test_durations_ignore_negative_input() {
    let mut durations = CumulativeDurations::default();
    durations.add(DurationClass::Online, 3.5);
    durations.add(DurationClass::Online, -10.0);
    durations.add(DurationClass::Online, f64::NAN);
    assert_eq!(durations.get(DurationClass::Online), 3.5);
}
