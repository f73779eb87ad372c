// Host-side tests for the celebration session: lit/extinguished transitions,
// relighting, manual fallback, visibility and the wish panel.

mod common;

use candle_wish::celebration::{Recipient, Variant, WishError};
use candle_wish::core::*;
use common::*;

fn sara() -> Recipient {
    Recipient::new("Sara", Variant::Female).unwrap()
}

/// Start a session and grant the microphone.
fn listening() -> (TestController, Rig) {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    let pending = ctrl.start_session(sara());
    assert_eq!(settle(&mut ctrl, pending), ActivationOutcome::Granted);
    (ctrl, rig)
}

#[test]
fn new_session_is_lit_and_requests_the_microphone() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    let pending = ctrl.start_session(sara());
    assert!(ctrl.is_lit());
    assert_eq!(ctrl.permission(), DetectorState::PermissionPending);
    assert!(pending.is_some());

    settle(&mut ctrl, pending);
    assert_eq!(ctrl.permission(), DetectorState::PermissionGranted);
    assert_eq!(
        ctrl.events().permissions,
        vec![DetectorState::PermissionPending, DetectorState::PermissionGranted]
    );
    assert_eq!(rig.devices.live.get(), 1);
}

#[test]
fn blowing_extinguishes_and_releases_the_microphone() {
    let (mut ctrl, rig) = listening();
    rig.push_levels(&[5, 20, 25, 5]);
    frame(&mut ctrl, &rig.ticks, ms(0));
    frame(&mut ctrl, &rig.ticks, ms(16));
    assert!(ctrl.is_lit());
    frame(&mut ctrl, &rig.ticks, ms(32));

    assert!(!ctrl.is_lit());
    assert_eq!(ctrl.events().extinguished, vec![TriggerSource::Sound]);
    assert_eq!(ctrl.events().levels.len(), 3);
    assert!(!ctrl.detector().is_sampling());
    assert_eq!(rig.devices.live.get(), 0);
    // no frame left scheduled once the candles are out
    assert!(!rig.ticks.pending.get());
    assert!(ctrl.cooldown_active());
}

#[test]
fn manual_trigger_is_idempotent() {
    let (mut ctrl, _rig) = listening();
    assert!(ctrl.on_external_trigger(TriggerSource::Manual));
    assert!(!ctrl.on_external_trigger(TriggerSource::Manual));
    assert!(!ctrl.on_external_trigger(TriggerSource::Sound));
    assert_eq!(ctrl.events().extinguished, vec![TriggerSource::Manual]);
}

#[test]
fn trigger_without_session_is_ignored() {
    let (mut ctrl, _rig) = controller(DetectorConfig::default());
    assert!(!ctrl.on_external_trigger(TriggerSource::Manual));
    assert!(ctrl.events().extinguished.is_empty());
}

#[test]
fn relight_restores_lit_and_resumes_sampling() {
    let (mut ctrl, rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    ctrl.open_sharing();

    let pending = ctrl.relight();
    assert!(ctrl.is_lit());
    assert_eq!(ctrl.session().unwrap().panel, Panel::Closed);
    assert_eq!(ctrl.events().relit, 1);
    assert_eq!(settle(&mut ctrl, pending), ActivationOutcome::Granted);
    assert!(ctrl.detector().is_sampling());
    assert!(rig.ticks.pending.get());
    assert_eq!(rig.devices.live.get(), 1);
    assert_eq!(rig.devices.max_live.get(), 1);
}

#[test]
fn relight_while_lit_does_nothing() {
    let (mut ctrl, rig) = listening();
    assert!(ctrl.relight().is_none());
    assert_eq!(ctrl.events().relit, 0);
    assert_eq!(rig.devices.requests.get(), 1);
}

#[test]
fn quick_relight_respects_the_cooldown() {
    let (mut ctrl, rig) = listening();
    rig.push_levels(&[40, 40]);
    frame(&mut ctrl, &rig.ticks, ms(0));
    frame(&mut ctrl, &rig.ticks, ms(16));
    assert!(!ctrl.is_lit());

    let pending = ctrl.relight();
    settle(&mut ctrl, pending);
    rig.push_levels(&[40, 40, 40]);
    frame(&mut ctrl, &rig.ticks, ms(100));
    frame(&mut ctrl, &rig.ticks, ms(116));
    frame(&mut ctrl, &rig.ticks, ms(132));
    assert!(ctrl.is_lit());

    rig.push_levels(&[40]);
    frame(&mut ctrl, &rig.ticks, ms(1100));
    assert!(!ctrl.is_lit());
    assert_eq!(ctrl.events().extinguished.len(), 2);
}

#[test]
fn permission_denied_leaves_only_the_manual_path() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    rig.fail_with(AcquireError::PermissionDenied);
    let pending = ctrl.start_session(sara());
    assert_eq!(
        settle(&mut ctrl, pending),
        ActivationOutcome::Failed(AcquireError::PermissionDenied)
    );
    assert_eq!(ctrl.permission(), DetectorState::PermissionDenied);
    assert_eq!(ctrl.events().fallbacks, vec![AcquireError::PermissionDenied]);
    // no sampling loop, so sound can never extinguish
    assert!(!rig.ticks.pending.get());
    assert!(ctrl.is_lit());

    assert!(ctrl.on_external_trigger(TriggerSource::Manual));
    assert!(!ctrl.is_lit());

    // relighting does not prompt again
    assert!(ctrl.relight().is_none());
    assert_eq!(rig.devices.requests.get(), 1);
    assert_eq!(ctrl.events().fallbacks.len(), 2);
}

#[test]
fn unsupported_platform_falls_back_without_request() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    *rig.support.borrow_mut() = Err(AcquireError::InsecureContext);
    assert!(ctrl.start_session(sara()).is_none());
    assert_eq!(ctrl.permission(), DetectorState::Unsupported);
    assert_eq!(ctrl.events().fallbacks, vec![AcquireError::InsecureContext]);
    assert_eq!(rig.devices.requests.get(), 0);
}

#[test]
fn revoked_permission_stops_sampling() {
    let (mut ctrl, rig) = listening();
    ctrl.on_permission_revoked();
    assert_eq!(ctrl.permission(), DetectorState::PermissionDenied);
    assert_eq!(rig.devices.live.get(), 0);
    assert!(!rig.ticks.pending.get());
    assert_eq!(ctrl.events().fallbacks, vec![AcquireError::PermissionDenied]);
    assert!(ctrl.is_lit());
}

#[test]
fn hidden_page_releases_and_visible_page_resumes() {
    let (mut ctrl, rig) = listening();
    assert!(ctrl.set_visible(false).is_none());
    assert_eq!(rig.devices.live.get(), 0);

    let pending = ctrl.set_visible(true);
    settle(&mut ctrl, pending);
    assert_eq!(rig.devices.live.get(), 1);
    assert_eq!(rig.devices.max_live.get(), 1);
}

#[test]
fn hidden_then_shown_before_grant_keeps_one_device() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    let first = ctrl.start_session(sara());
    ctrl.set_visible(false);
    let second = ctrl.set_visible(true);

    assert_eq!(settle(&mut ctrl, first), ActivationOutcome::Stale);
    assert_eq!(settle(&mut ctrl, second), ActivationOutcome::Granted);
    assert_eq!(rig.devices.live.get(), 1);
    assert_eq!(rig.devices.max_live.get(), 1);
}

#[test]
fn extinguished_page_does_not_listen_when_shown() {
    let (mut ctrl, rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    ctrl.set_visible(false);
    assert!(ctrl.set_visible(true).is_none());
    assert_eq!(rig.devices.live.get(), 0);
}

#[test]
fn ending_the_session_releases_everything() {
    let (mut ctrl, rig) = listening();
    ctrl.end_session();
    assert!(ctrl.session().is_none());
    assert_eq!(rig.devices.live.get(), 0);
    assert!(!rig.ticks.pending.get());
}

#[test]
fn restarting_a_session_replaces_the_old_one() {
    let (mut ctrl, rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    let pending = ctrl.start_session(Recipient::new("Omar", Variant::Male).unwrap());
    settle(&mut ctrl, pending);
    assert!(ctrl.is_lit());
    assert_eq!(ctrl.session().unwrap().recipient.name(), "Omar");
    assert_eq!(rig.devices.live.get(), 1);
}

#[test]
fn wish_requires_extinguished_candles() {
    let (mut ctrl, _rig) = listening();
    assert!(!ctrl.open_wish_form());
    assert_eq!(ctrl.submit_wish("a pony"), Err(WishError::CandlesLit));

    ctrl.on_external_trigger(TriggerSource::Manual);
    assert!(ctrl.open_wish_form());
    assert_eq!(ctrl.session().unwrap().panel, Panel::WishForm);
}

#[test]
fn wish_is_sent_once() {
    let (mut ctrl, _rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    ctrl.open_wish_form();

    assert_eq!(ctrl.submit_wish("   "), Err(WishError::Empty));
    let wish = ctrl.submit_wish("  a trip to the sea ").unwrap();
    assert_eq!(wish.text, "a trip to the sea");
    assert_eq!(wish.recipient, "Sara");
    assert_eq!(wish.variant, Variant::Female);

    let session = ctrl.session().unwrap();
    assert!(session.wish_sent);
    assert_eq!(session.panel, Panel::Closed);
    assert_eq!(ctrl.events().wishes.len(), 1);

    assert_eq!(ctrl.submit_wish("another"), Err(WishError::AlreadySent));
    assert!(!ctrl.open_wish_form());
}

#[test]
fn relight_allows_a_new_wish() {
    let (mut ctrl, _rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    ctrl.submit_wish("first").unwrap();
    let _ = ctrl.relight();
    ctrl.on_external_trigger(TriggerSource::Manual);
    assert!(ctrl.submit_wish("second").is_ok());
}

#[test]
fn overlong_wish_is_rejected() {
    let (mut ctrl, _rig) = listening();
    ctrl.on_external_trigger(TriggerSource::Manual);
    let long = "x".repeat(201);
    assert_eq!(ctrl.submit_wish(&long), Err(WishError::TooLong(201)));
    assert!(ctrl.submit_wish(&"x".repeat(200)).is_ok());
}

#[test]
fn wish_without_session_is_rejected() {
    let (mut ctrl, _rig) = controller(DetectorConfig::default());
    assert_eq!(ctrl.submit_wish("hi"), Err(WishError::NoSession));
}

#[test]
fn panels_open_and_close() {
    let (mut ctrl, _rig) = listening();
    assert!(!ctrl.open_sharing());
    ctrl.on_external_trigger(TriggerSource::Manual);
    assert!(ctrl.open_sharing());
    assert_eq!(ctrl.session().unwrap().panel, Panel::Sharing);
    ctrl.close_panel();
    assert_eq!(ctrl.session().unwrap().panel, Panel::Closed);
}

#[test]
fn manual_trigger_during_prompt_leaves_permission_idle() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    let pending = ctrl.start_session(sara());
    ctrl.on_external_trigger(TriggerSource::Manual);
    assert_eq!(ctrl.permission(), DetectorState::Idle);
    assert_eq!(ctrl.events().permissions.last(), Some(&DetectorState::Idle));

    assert_eq!(settle(&mut ctrl, pending), ActivationOutcome::Stale);
    assert_eq!(rig.devices.live.get(), 0);

    // relighting asks again and listens
    let pending = ctrl.relight();
    assert_eq!(ctrl.permission(), DetectorState::PermissionPending);
    assert_eq!(settle(&mut ctrl, pending), ActivationOutcome::Granted);
    assert!(ctrl.detector().is_sampling());
}

#[test]
fn denial_after_manual_trigger_is_recorded_quietly() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    rig.fail_with(AcquireError::PermissionDenied);
    let pending = ctrl.start_session(sara());
    ctrl.on_external_trigger(TriggerSource::Manual);

    assert_eq!(
        settle(&mut ctrl, pending),
        ActivationOutcome::Failed(AcquireError::PermissionDenied)
    );
    assert_eq!(ctrl.permission(), DetectorState::PermissionDenied);
    assert_eq!(
        ctrl.events().permissions.last(),
        Some(&DetectorState::PermissionDenied)
    );
    // candles are already out, so no pointer to the cake
    assert!(ctrl.events().fallbacks.is_empty());
}

#[test]
fn denial_while_hidden_is_not_lost() {
    let (mut ctrl, rig) = controller(DetectorConfig::default());
    rig.fail_with(AcquireError::PermissionDenied);
    let pending = ctrl.start_session(sara());
    ctrl.set_visible(false);

    assert_eq!(
        settle(&mut ctrl, pending),
        ActivationOutcome::Failed(AcquireError::PermissionDenied)
    );
    assert_eq!(ctrl.permission(), DetectorState::PermissionDenied);
    assert_eq!(ctrl.events().fallbacks, vec![AcquireError::PermissionDenied]);

    // coming back does not prompt again
    assert!(ctrl.set_visible(true).is_none());
    assert_eq!(rig.devices.requests.get(), 1);
}

#[test]
fn page_hidden_and_restored_keeps_the_session() {
    let (mut ctrl, rig) = listening();
    ctrl.set_visible(false);
    assert!(ctrl.session().is_some());
    assert_eq!(rig.devices.live.get(), 0);

    // while away, nothing is requested but the cake still works
    assert!(ctrl.on_external_trigger(TriggerSource::Manual));
    assert!(ctrl.relight().is_none());
    assert!(ctrl.is_lit());
    assert_eq!(rig.devices.requests.get(), 1);

    let pending = ctrl.set_visible(true);
    assert_eq!(settle(&mut ctrl, pending), ActivationOutcome::Granted);
    assert_eq!(rig.devices.live.get(), 1);
}
