use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::dispatcher::Dispatcher;
use crate::sync::SharedDispatcher;
use crate::time::{ManualClock, Span, Tick};
use crate::DispatcherConfig;

#[test]
fn shared_dispatcher_accepts_timers_from_many_threads() {
    let config = DispatcherConfig::builder().capacity(64).build();
    let shared = SharedDispatcher::new(Dispatcher::with_config(config, ManualClock::default()));
    let fired = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let fired = Arc::clone(&fired);
            thread::spawn(move || {
                (0..5)
                    .map(|i| {
                        let fired = Arc::clone(&fired);
                        shared
                            .schedule_once(Span::from_millis(i), move || {
                                fired.fetch_add(1, Ordering::SeqCst);
                                Ok(())
                            })
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.extend(handle.join().unwrap());
    }
    assert_eq!(ids.len(), 20);
    assert_eq!(shared.len(), 20);

    let report = shared.run_once(Tick::new(10));

    assert_eq!(report.fired.len(), 20);
    assert_eq!(fired.load(Ordering::SeqCst), 20);
    assert!(shared.is_empty());
}

#[test]
fn shared_cancel_and_inspect() {
    let shared = SharedDispatcher::new(Dispatcher::new(ManualClock::default()));
    let id = shared
        .schedule_periodic(Span::from_millis(10), || Ok(()))
        .unwrap();

    assert_eq!(shared.next_due(), Some(Tick::new(10)));
    assert!(shared.cancel(id));
    assert_eq!(shared.with(|d| d.occupied()), 1);
    assert_eq!(shared.run_once(Tick::new(10)).purged, 1);
    assert_eq!(shared.state(id), None);
}
