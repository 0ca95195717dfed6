use crate::time::{Clock, ManualClock, Span, Tick};

#[test]
fn manual_clock_is_shared_between_clones() {
    let clock = ManualClock::default();
    let view = clock.clone();

    clock.advance(Span::from_millis(250));

    assert_eq!(view.now(), Tick::new(250));
}

#[test]
fn manual_clock_never_goes_backwards() {
    let clock = ManualClock::new(Tick::new(100));

    clock.set(Tick::new(40));
    assert_eq!(clock.now(), Tick::new(100));

    clock.set(Tick::new(140));
    assert_eq!(clock.now(), Tick::new(140));
}

#[test]
fn tick_arithmetic_detects_overflow() {
    let near_end = Tick::new(u64::MAX - 1);

    assert_eq!(near_end.checked_add(Span::from_ticks(2)), None);
    assert_eq!(near_end + Span::from_ticks(2), Tick::MAX);
    assert_eq!(
        Tick::new(10).checked_add(Span::from_ticks(5)),
        Some(Tick::new(15))
    );
}

#[test]
fn saturating_since_clamps_future_ticks() {
    assert_eq!(
        Tick::new(30).saturating_since(Tick::new(10)),
        Span::from_ticks(20)
    );
    assert_eq!(Tick::new(10).saturating_since(Tick::new(30)), Span::ZERO);
}

#[test]
fn span_unit_helpers() {
    assert_eq!(Span::from_secs(2), Span::from_millis(2000));
    assert!(Span::ZERO.is_zero());
    assert_eq!(Span::from_millis(500).to_string(), "500ticks");
}
