//! Structured trace records emitted by the dispatcher.

use std::sync::Arc;

use crate::time::{Span, Tick};
use crate::timer::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceRecord {
    /// Timer created with its first due time and optional period.
    Armed {
        id: TimerId,
        due_at: Tick,
        period: Option<Span>,
    },
    /// Scheduled timer cancelled by its owner.
    Disarmed { id: TimerId, due_at: Tick },
    /// Cancel requested for an unknown or already terminal timer.
    DisarmAttempt { id: TimerId },
    /// Action invoked for the firing nominally due at `due_at`.
    Posted { id: TimerId, due_at: Tick, now: Tick },
    /// One-shot timer retired after firing.
    AutoDisarm { id: TimerId },
    /// Cancelled timer dropped from the pending set.
    Purged { id: TimerId },
}

/// Callback receiving every [`TraceRecord`].
pub type TraceHook = Arc<dyn Fn(&TraceRecord) + Send + Sync>;
