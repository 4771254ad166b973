use std::time::Duration;

use tokio::time::Instant;

use super::*;

#[test]
fn unknown_follower_is_not_active() {
    let activity = FollowerActivity::new();

    assert!(!activity.is_follower_active_since(2, Instant::now(), Duration::from_secs(6)));
}

#[test]
fn follower_is_active_within_window() {
    let activity = FollowerActivity::new();
    let heard_at = Instant::now();
    activity.record(2, heard_at);

    let window = Duration::from_secs(6);
    assert!(activity.is_follower_active_since(2, heard_at + Duration::from_secs(6), window));
    assert!(!activity.is_follower_active_since(2, heard_at + Duration::from_secs(7), window));
}

#[test]
fn record_should_not_move_timestamp_backwards() {
    let activity = FollowerActivity::new();
    let newer = Instant::now() + Duration::from_secs(10);
    activity.record(3, newer);
    activity.record(3, newer - Duration::from_secs(5));

    assert_eq!(activity.last_update(3), Some(newer));
}

#[test]
fn timestamp_after_now_counts_as_active() {
    let activity = FollowerActivity::new();
    let now = Instant::now();
    activity.record(4, now + Duration::from_secs(1));

    assert!(activity.is_follower_active_since(4, now, Duration::from_millis(1)));
}

#[test]
fn removed_follower_is_not_active() {
    let activity = FollowerActivity::new();
    let now = Instant::now();
    activity.record_all([2, 3], now);
    activity.remove(2);

    assert!(!activity.is_follower_active_since(2, now, Duration::from_secs(1)));
    assert!(activity.is_follower_active_since(3, now, Duration::from_secs(1)));
}
