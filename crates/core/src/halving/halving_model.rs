use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Blocks between two subsidy halvings.
pub const HALVING_INTERVAL_BLOCKS: u64 = 210_000;

/// Block subsidy of the first epoch, in satoshis (50 BTC).
pub const INITIAL_SUBSIDY_SATS: i64 = 5_000_000_000;

/// Average seconds between blocks used for the time estimate.
pub const AVERAGE_BLOCK_SECS: i64 = 600;

/// Halving data derived from a chain tip height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HalvingSnapshot {
    pub height: u64,
    /// Number of halvings that already happened.
    pub epoch: u32,
    /// Current block subsidy in BTC.
    pub block_reward: Decimal,
    pub next_halving_height: u64,
    pub blocks_remaining: u64,
    /// When the next halving is expected at 10 minutes per block.
    pub estimated_at: DateTime<Utc>,
    pub source: String,
}

impl HalvingSnapshot {
    /// Derives the snapshot for `height`, or `None` when the next halving
    /// height or its date cannot be represented.
    pub fn from_height(height: u64, now: DateTime<Utc>) -> Option<Self> {
        let epoch = height / HALVING_INTERVAL_BLOCKS;
        let next_halving_height = epoch.checked_add(1)?.checked_mul(HALVING_INTERVAL_BLOCKS)?;
        let blocks_remaining = next_halving_height - height;
        let secs = i64::try_from(blocks_remaining)
            .ok()?
            .checked_mul(AVERAGE_BLOCK_SECS)?;

        Some(Self {
            height,
            epoch: u32::try_from(epoch).ok()?,
            block_reward: block_reward_at(height),
            next_halving_height,
            blocks_remaining,
            estimated_at: now.checked_add_signed(Duration::seconds(secs))?,
            source: String::new(),
        })
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Time left until the estimated halving, zero once it has passed.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.estimated_at - now).max(Duration::zero())
    }
}

/// Block subsidy in BTC at `height`: 50 BTC halved every 210 000 blocks,
/// computed in whole satoshis.
pub fn block_reward_at(height: u64) -> Decimal {
    let halvings = height / HALVING_INTERVAL_BLOCKS;
    let sats = if halvings >= 63 {
        0
    } else {
        INITIAL_SUBSIDY_SATS >> halvings
    };
    Decimal::new(sats, 8).normalize()
}

/// What the halving display should show after a refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum HalvingStatus {
    Available { snapshot: HalvingSnapshot },
    Unavailable { reason: String },
}

impl HalvingStatus {
    pub fn snapshot(&self) -> Option<&HalvingSnapshot> {
        match self {
            Self::Available { snapshot } => Some(snapshot),
            Self::Unavailable { .. } => None,
        }
    }
}
