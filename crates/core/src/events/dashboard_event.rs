//! Dashboard event types.

use serde::Serialize;

use crate::halving::HalvingStatus;
use crate::prices::PriceStatus;

/// Events emitted by the refresh tasks for the display layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// Headline price refreshed (live, last known, or unavailable).
    PriceUpdated(PriceStatus),

    /// Halving data refreshed.
    HalvingUpdated(HalvingStatus),
}

impl DashboardEvent {
    pub fn price_updated(status: PriceStatus) -> Self {
        Self::PriceUpdated(status)
    }

    pub fn halving_updated(status: HalvingStatus) -> Self {
        Self::HalvingUpdated(status)
    }
}
