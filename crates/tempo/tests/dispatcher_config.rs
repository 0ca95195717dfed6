//! Tests for DispatcherConfig builder and its effect on a dispatcher.

use tempo::config::DEFAULT_CAPACITY;
use tempo::{DispatchError, Dispatcher, DispatcherConfig, ManualClock, Span};

#[test]
fn dispatcher_config_builder() {
    let config = DispatcherConfig::builder()
        .name("blinky")
        .capacity(4)
        .late_warning(Span::from_millis(20))
        .build();

    assert_eq!(config.name, "blinky");
    assert_eq!(config.capacity, 4);
    assert_eq!(config.late_warning, Some(Span::from_millis(20)));
}

#[test]
fn dispatcher_config_default() {
    let config = DispatcherConfig::default();

    assert_eq!(config.name, "tempo");
    assert_eq!(config.capacity, DEFAULT_CAPACITY);
    assert_eq!(config.late_warning, None);
}

#[test]
fn dispatcher_with_custom_config() {
    let config = DispatcherConfig::builder().name("tiny").capacity(1).build();
    let mut dispatcher = Dispatcher::with_config(config, ManualClock::default());

    assert_eq!(dispatcher.config().name, "tiny");
    assert_eq!(dispatcher.capacity(), 1);

    dispatcher
        .schedule_once(Span::from_millis(1), || Ok(()))
        .unwrap();
    assert_eq!(
        dispatcher.schedule_once(Span::from_millis(1), || Ok(())),
        Err(DispatchError::CapacityExceeded { capacity: 1 })
    );
}

#[test]
fn zero_capacity_rejects_everything() {
    let config = DispatcherConfig::builder().capacity(0).build();
    let mut dispatcher = Dispatcher::with_config(config, ManualClock::default());

    assert!(dispatcher
        .schedule_periodic(Span::from_millis(10), || Ok(()))
        .is_err());
    assert!(dispatcher.is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn dispatcher_config_from_partial_json() {
    let config: DispatcherConfig = serde_json::from_str(r#"{ "capacity": 8 }"#).unwrap();

    assert_eq!(config.capacity, 8);
    assert_eq!(config.name, "tempo");
}
