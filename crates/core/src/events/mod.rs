//! Dashboard events and sinks.
//!
//! The refresh tasks do not render anything themselves; they emit
//! [`DashboardEvent`]s into a [`DashboardSink`] supplied by the application.

mod dashboard_event;
mod sink;

pub use dashboard_event::DashboardEvent;
pub use sink::{DashboardSink, MockDashboardSink};
