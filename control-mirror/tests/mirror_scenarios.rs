// End-to-end behaviour of the mirror engine on a virtual clock
use control_mirror::host::{ManualScheduler, MemorySpace, PanelRecorder};
use control_mirror::{
    Classification, DebugLevel, EngineConfig, EngineEvent, IndicatorState, MirrorEngine, TypeTag,
};
use std::time::Duration;

type Engine = MirrorEngine<MemorySpace, ManualScheduler, PanelRecorder>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn studio() -> MemorySpace {
    let mut space = MemorySpace::new();
    space
        .add_component("Mixer")
        .with_control("mute", TypeTag::Button, false)
        .with_control("solo", TypeTag::Button, true)
        .with_control("name", TypeTag::Text, false)
        .with_property("label", "Main mixer");
    space
        .add_component("Snapshots")
        .with_control("load", TypeTag::Trigger, false);
    space
        .add_component("Vault")
        .with_control("open", TypeTag::Button, true);
    space.set_accessible("Vault", false);
    space
}

fn engine_with(count: usize, feedback: f64, identifiers: &[(usize, &str)]) -> Engine {
    init_logging();
    let config = EngineConfig::new()
        .with_count(count)
        .with_trigger_feedback(feedback)
        .with_debug_level(DebugLevel::All);
    let mut engine =
        MirrorEngine::new(config, studio(), ManualScheduler::new(), PanelRecorder::new());
    for (slot, identifier) in identifiers {
        engine.set_identifier(*slot, *identifier).unwrap();
    }
    engine.start();
    engine
}

/// Advance the virtual clock and deliver expired timers
fn advance_to(engine: &mut Engine, millis: u64) {
    let expired = engine.scheduler_mut().advance_to(Duration::from_millis(millis));
    for token in expired {
        engine.handle_event(EngineEvent::TimerExpired(token));
    }
    engine.process_pending();
}

fn pulse(engine: &mut Engine, component: &str, control: &str) {
    engine.space_mut().pulse(component, control).unwrap();
    engine.process_pending();
}

#[test]
fn valid_identifiers_bind() {
    let engine = engine_with(
        3,
        0.5,
        &[(1, "Mixer.mute"), (2, "Mixer.solo"), (3, "Snapshots.load")],
    );

    for index in 1..=3 {
        let slot = engine.slot(index).unwrap();
        assert!(slot.is_valid(), "slot {} should be valid", index);
        assert!(!engine.panel().state(index).unwrap().indeterminate);
    }
    assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(false)));
    assert_eq!(engine.panel().state(2), Some(IndicatorState::valid(true)));
    // Trigger slots start unlit whatever the control's value
    assert_eq!(engine.panel().state(3), Some(IndicatorState::valid(false)));
    assert_eq!(
        engine.slot(3).unwrap().classification(),
        Some(Classification::Trigger)
    );
}

#[test]
fn unresolvable_identifiers_are_indeterminate() {
    let engine = engine_with(
        6,
        0.5,
        &[
            (1, ""),
            (2, "Mixer"),
            (3, "Nowhere.mute"),
            (4, "Mixer.nothing"),
            (5, "Mixer.label"),
            (6, "Vault.open"),
        ],
    );

    for index in 1..=6 {
        let slot = engine.slot(index).unwrap();
        assert!(!slot.is_valid(), "slot {} should be invalid", index);
        assert!(!slot.is_lit());
        assert_eq!(engine.panel().state(index), Some(IndicatorState::INDETERMINATE));
    }

    assert!(engine.slot(1).unwrap().last_error().is_none());
    let errors: Vec<String> = engine
        .snapshot()
        .into_iter()
        .filter_map(|s| s.error)
        .collect();
    assert_eq!(
        errors,
        vec![
            "identifier \"Mixer\" has no '.' separator after a component name".to_string(),
            "component not found: \"Nowhere\"".to_string(),
            "control not found: \"nothing\" in component \"Mixer\"".to_string(),
            "control not found: \"label\" in component \"Mixer\"".to_string(),
            "component not found: \"Vault\"".to_string(),
        ]
    );
}

#[test]
fn one_bad_slot_does_not_stop_the_others() {
    let engine = engine_with(3, 0.5, &[(1, "Broken"), (2, "Nowhere.x"), (3, "Mixer.solo")]);
    assert!(engine.slot(3).unwrap().is_valid());
    assert!(engine.slot(3).unwrap().is_lit());
}

#[test]
fn trigger_lights_for_the_feedback_period() {
    let mut engine = engine_with(1, 1.5, &[(1, "Snapshots.load")]);

    pulse(&mut engine, "Snapshots", "load");
    assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(true)));

    advance_to(&mut engine, 1499);
    assert!(engine.slot(1).unwrap().is_lit(), "must not go dark early");

    advance_to(&mut engine, 1500);
    assert!(!engine.slot(1).unwrap().is_lit());
    assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(false)));
}

#[test]
fn trigger_does_not_retrigger() {
    let mut engine = engine_with(1, 1.5, &[(1, "Snapshots.load")]);

    pulse(&mut engine, "Snapshots", "load");
    advance_to(&mut engine, 500);
    pulse(&mut engine, "Snapshots", "load");
    assert!(engine.slot(1).unwrap().is_lit());
    assert_eq!(engine.scheduler().scheduled_total(), 1);

    advance_to(&mut engine, 1500);
    assert!(!engine.slot(1).unwrap().is_lit(), "original deadline holds");

    // A fresh notification after expiry starts a new period
    pulse(&mut engine, "Snapshots", "load");
    assert!(engine.slot(1).unwrap().is_lit());
    advance_to(&mut engine, 2999);
    assert!(engine.slot(1).unwrap().is_lit());
    advance_to(&mut engine, 3000);
    assert!(!engine.slot(1).unwrap().is_lit());
}

#[test]
fn text_controls_behave_as_triggers() {
    let mut engine = engine_with(1, 0.25, &[(1, "Mixer.name")]);

    engine.space_mut().set_value("Mixer", "name", true).unwrap();
    engine.process_pending();
    assert!(engine.slot(1).unwrap().is_lit());

    advance_to(&mut engine, 250);
    assert!(!engine.slot(1).unwrap().is_lit());
}

#[test]
fn continuous_controls_mirror_immediately() {
    let mut engine = engine_with(1, 1.5, &[(1, "Mixer.mute")]);
    assert!(!engine.slot(1).unwrap().is_lit());

    engine.space_mut().set_value("Mixer", "mute", true).unwrap();
    engine.process_pending();
    assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(true)));
    assert_eq!(engine.scheduler().scheduled_total(), 0);

    engine.space_mut().set_value("Mixer", "mute", false).unwrap();
    engine.process_pending();
    assert_eq!(engine.panel().state(1), Some(IndicatorState::valid(false)));
}

#[test]
fn rebind_is_idempotent() {
    let mut engine = engine_with(3, 0.5, &[(1, "Mixer.mute"), (2, "Mixer.solo"), (3, "Nowhere.x")]);
    let before = engine.snapshot();

    engine.rebind();
    engine.rebind();

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.space().subscriber_count("Mixer", "mute"), 1);
    assert_eq!(engine.space().subscriber_count("Mixer", "solo"), 1);
    assert_eq!(engine.table().subscription_count(), 2);
}

#[test]
fn same_control_in_two_slots_gets_two_subscriptions() {
    let mut engine = engine_with(2, 0.5, &[(1, "Mixer.mute"), (2, "Mixer.mute")]);
    assert_eq!(engine.space().subscriber_count("Mixer", "mute"), 2);

    engine.space_mut().set_value("Mixer", "mute", true).unwrap();
    engine.process_pending();
    assert!(engine.slot(1).unwrap().is_lit());
    assert!(engine.slot(2).unwrap().is_lit());
}

#[test]
fn resize_down_and_up() {
    let mut engine = engine_with(
        5,
        0.5,
        &[
            (1, "Mixer.mute"),
            (2, "Mixer.solo"),
            (3, "Snapshots.load"),
            (4, "Mixer.solo"),
            (5, ""),
        ],
    );
    assert_eq!(engine.space().total_subscribers(), 4);

    engine.set_count(3);
    assert_eq!(engine.slot_count(), 3);
    assert_eq!(engine.panel().len(), 3);
    assert!(engine.slot(4).is_none());
    assert_eq!(engine.space().subscriber_count("Mixer", "solo"), 1);
    assert!((1..=3).all(|i| engine.slot(i).unwrap().is_valid()));

    engine.set_count(5);
    assert_eq!(engine.slot_count(), 5);
    // Slots 4 and 5 come back empty, not with their old identifiers
    for index in 4..=5 {
        assert_eq!(engine.identifier(index), Some(""));
        assert!(!engine.slot(index).unwrap().is_valid());
        assert_eq!(engine.panel().state(index), Some(IndicatorState::INDETERMINATE));
    }
    assert_eq!(engine.space().subscriber_count("Mixer", "solo"), 1);
    assert_eq!(engine.space().total_subscribers(), 3);
}

#[test]
fn count_is_clamped() {
    let mut engine = engine_with(2, 0.5, &[]);
    engine.set_count(0);
    assert_eq!(engine.slot_count(), 1);
    engine.set_count(1000);
    assert_eq!(engine.slot_count(), 100);
}

#[test]
fn rebind_discards_pending_trigger() {
    let mut engine = engine_with(2, 1.0, &[(1, "Snapshots.load")]);

    pulse(&mut engine, "Snapshots", "load");
    assert!(engine.slot(1).unwrap().is_lit());

    // Any identifier change rebinds every slot and resets slot 1
    engine.set_identifier(2, "Mixer.mute").unwrap();
    assert!(!engine.slot(1).unwrap().is_lit());
    assert!(!engine.slot(1).unwrap().trigger().is_active());

    // The old timer (due at 1000ms) must not end the new period
    advance_to(&mut engine, 500);
    pulse(&mut engine, "Snapshots", "load");
    advance_to(&mut engine, 1000);
    assert!(engine.slot(1).unwrap().is_lit(), "stale timer ignored");
    assert_eq!(engine.scheduler().pending_count(), 1);

    advance_to(&mut engine, 1500);
    assert!(!engine.slot(1).unwrap().is_lit());
}

#[test]
fn notifications_queued_before_rebind_are_ignored() {
    let mut engine = engine_with(1, 0.5, &[(1, "Mixer.mute")]);

    engine.space_mut().set_value("Mixer", "mute", true).unwrap();
    // Retarget before the notification is handled
    engine.set_identifier(1, "Mixer.solo").unwrap();
    engine.space_mut().set_value("Mixer", "solo", false).unwrap();
    engine.process_pending();

    assert!(!engine.slot(1).unwrap().is_lit());
    assert_eq!(engine.space().subscriber_count("Mixer", "mute"), 0);
}

#[test]
fn control_appearing_later_binds_on_next_rebind() {
    let mut engine = engine_with(1, 0.5, &[(1, "Late.flag")]);
    assert!(!engine.slot(1).unwrap().is_valid());

    engine
        .space_mut()
        .add_component("Late")
        .with_control("flag", TypeTag::Button, true);
    engine.set_identifier(1, "Late.flag").unwrap();

    assert!(engine.slot(1).unwrap().is_valid());
    assert!(engine.slot(1).unwrap().is_lit());
}

#[test]
fn feedback_change_applies_to_later_triggers() {
    let mut engine = engine_with(1, 1.0, &[(1, "Snapshots.load")]);
    engine.handle_event(EngineEvent::TriggerFeedbackChanged(2.0));

    pulse(&mut engine, "Snapshots", "load");
    advance_to(&mut engine, 1999);
    assert!(engine.slot(1).unwrap().is_lit());
    advance_to(&mut engine, 2000);
    assert!(!engine.slot(1).unwrap().is_lit());
}

#[test]
fn zero_feedback_flashes_for_one_turn() {
    let mut engine = engine_with(1, 0.0, &[(1, "Snapshots.load")]);

    pulse(&mut engine, "Snapshots", "load");
    assert!(engine.slot(1).unwrap().is_lit());
    advance_to(&mut engine, 0);
    assert!(!engine.slot(1).unwrap().is_lit());

    let lit_updates = engine
        .panel()
        .history()
        .iter()
        .filter(|(slot, state)| *slot == 1 && state.lit)
        .count();
    assert_eq!(lit_updates, 1);
}
