use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observed height of the Bitcoin chain tip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeight {
    pub height: u64,
    pub source: String,
    pub observed_at: DateTime<Utc>,
}
