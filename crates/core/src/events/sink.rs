//! Dashboard event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::DashboardEvent;

/// Trait for receiving dashboard events.
///
/// Implementations translate events into display updates (terminal output,
/// a UI bridge, etc.). The refresh tasks emit after every refresh, success or
/// not.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking (no network calls)
/// - Failure to emit must not affect the refresh tasks (best-effort)
pub trait DashboardSink: Send + Sync {
    /// Emit a single event.
    fn emit(&self, event: DashboardEvent);
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockDashboardSink {
    events: Arc<Mutex<Vec<DashboardEvent>>>,
}

impl MockDashboardSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<DashboardEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DashboardSink for MockDashboardSink {
    fn emit(&self, event: DashboardEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
