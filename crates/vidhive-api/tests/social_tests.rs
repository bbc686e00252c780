//! Toggle relations, channel aggregation, and read projections.

mod common;

use common::{register, test_state};
use uuid::Uuid;
use vidhive_api::error::ApiError;
use vidhive_api::profile::{
    channel_profile, liked_targets, subscribed_channels, watch_history,
};
use vidhive_api::relations::{exists, toggle};
use vidhive_api::session::authenticate;
use vidhive_types::models::TargetKind;

#[test]
fn toggle_parity_flips_state() {
    let state = test_state();
    let alice = register(&state, "alice");
    let video = Uuid::new_v4();

    assert!(toggle(&state, &alice.id, &video, TargetKind::Video).unwrap());
    assert!(!toggle(&state, &alice.id, &video, TargetKind::Video).unwrap());
    assert!(toggle(&state, &alice.id, &video, TargetKind::Video).unwrap());
    assert!(exists(&state, &alice.id, &video, TargetKind::Video).unwrap());
}

#[test]
fn channel_profile_tracks_subscription_state() {
    let state = test_state();
    let alice = register(&state, "alice");
    let bob = register(&state, "bob");

    assert!(toggle(&state, &alice.id, &bob.id, TargetKind::Channel).unwrap());

    let viewer = {
        let pair = common::login(&state, "alice");
        authenticate(&state, Some(&pair.access_token)).unwrap()
    };

    let profile = channel_profile(&state, "bob", Some(&viewer)).unwrap();
    assert_eq!(profile.subscriber_count, 1);
    assert_eq!(profile.subscribed_to_count, 0);
    assert!(profile.is_subscribed);

    // Toggle off: counts and flag fall back immediately — computed fresh,
    // never cached.
    assert!(!toggle(&state, &alice.id, &bob.id, TargetKind::Channel).unwrap());
    let profile = channel_profile(&state, "bob", Some(&viewer)).unwrap();
    assert_eq!(profile.subscriber_count, 0);
    assert!(!profile.is_subscribed);
}

#[test]
fn channel_profile_without_viewer_never_flags_subscribed() {
    let state = test_state();
    let alice = register(&state, "alice");
    let bob = register(&state, "bob");

    toggle(&state, &alice.id, &bob.id, TargetKind::Channel).unwrap();

    let profile = channel_profile(&state, "Bob", None).unwrap();
    assert_eq!(profile.subscriber_count, 1);
    assert!(!profile.is_subscribed);
}

#[test]
fn unknown_channel_is_not_found() {
    let state = test_state();
    assert!(matches!(
        channel_profile(&state, "nobody", None),
        Err(ApiError::NotFound(_))
    ));
}

#[test]
fn subscribed_to_count_covers_outgoing_subscriptions() {
    let state = test_state();
    let alice = register(&state, "alice");
    let bob = register(&state, "bob");
    let carol = register(&state, "carol");

    toggle(&state, &bob.id, &alice.id, TargetKind::Channel).unwrap();
    toggle(&state, &bob.id, &carol.id, TargetKind::Channel).unwrap();

    let profile = channel_profile(&state, "bob", None).unwrap();
    assert_eq!(profile.subscriber_count, 0);
    assert_eq!(profile.subscribed_to_count, 2);

    // Newest-first projection of bob's channels.
    assert_eq!(
        subscribed_channels(&state, &bob.id).unwrap(),
        vec![carol.id, alice.id]
    );
}

#[test]
fn liked_targets_are_per_kind_and_newest_first() {
    let state = test_state();
    let alice = register(&state, "alice");

    let v1 = Uuid::new_v4();
    let v2 = Uuid::new_v4();
    let tweet = Uuid::new_v4();

    toggle(&state, &alice.id, &v1, TargetKind::Video).unwrap();
    toggle(&state, &alice.id, &v2, TargetKind::Video).unwrap();
    toggle(&state, &alice.id, &tweet, TargetKind::Tweet).unwrap();

    assert_eq!(
        liked_targets(&state, &alice.id, TargetKind::Video).unwrap(),
        vec![v2, v1]
    );
    assert_eq!(
        liked_targets(&state, &alice.id, TargetKind::Tweet).unwrap(),
        vec![tweet]
    );
    assert!(
        liked_targets(&state, &alice.id, TargetKind::Comment)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn watch_history_reads_back_newest_first() {
    let state = test_state();
    let alice = register(&state, "alice");

    let v1 = Uuid::new_v4();
    let v2 = Uuid::new_v4();

    vidhive_api::profile::record_watch(&state, &alice.id, &v1).unwrap();
    vidhive_api::profile::record_watch(&state, &alice.id, &v2).unwrap();
    vidhive_api::profile::record_watch(&state, &alice.id, &v1).unwrap();

    assert_eq!(watch_history(&state, &alice.id).unwrap(), vec![v1, v2]);
}
