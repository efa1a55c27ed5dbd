//! Terminal rendering of prices, halving data and dashboard events.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use satoshi_core::events::{DashboardEvent, DashboardSink};
use satoshi_core::halving::HalvingStatus;
use satoshi_core::prices::{PriceStatus, RateFreshness};

/// Placeholder shown when no value is known.
pub const PLACEHOLDER: &str = "--";

/// Formats `value` with `dp` decimals and thousands separators.
pub fn format_amount(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_fiat(value: Decimal, currency: &str) -> String {
    format!("{} {}", format_amount(value, 2), currency.to_uppercase())
}

pub fn format_price_status(status: &PriceStatus) -> String {
    match status {
        PriceStatus::Live { quote } => format!(
            "BTC {} ({})",
            format_fiat(quote.value(), quote.currency()),
            quote.source()
        ),
        PriceStatus::LastKnown {
            currency,
            value,
            captured_at,
        } => format!(
            "BTC {} (Cached{})",
            format_fiat(*value, currency),
            captured_at
                .map(|t| format!(", {}", format_time(t)))
                .unwrap_or_default()
        ),
        PriceStatus::Unavailable { currency } => {
            format!("BTC {} {} (unavailable)", PLACEHOLDER, currency.to_uppercase())
        }
    }
}

pub fn freshness_label(freshness: RateFreshness) -> &'static str {
    match freshness {
        RateFreshness::Live => "live",
        RateFreshness::Cached => "cached",
        RateFreshness::LastKnown => "last known",
    }
}

pub fn format_halving_status(status: &HalvingStatus, now: DateTime<Utc>) -> String {
    match status {
        HalvingStatus::Available { snapshot } => {
            let remaining = snapshot.time_remaining(now);
            format!(
                "Block {} | reward {} BTC | next halving at {} ({} blocks, ~{} days, est. {}) [{}]",
                snapshot.height,
                snapshot.block_reward.normalize(),
                snapshot.next_halving_height,
                snapshot.blocks_remaining,
                remaining.num_days(),
                snapshot.estimated_at.format("%Y-%m-%d"),
                snapshot.source
            )
        }
        HalvingStatus::Unavailable { .. } => {
            format!("Block {} | halving data unavailable", PLACEHOLDER)
        }
    }
}

fn format_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Prints every dashboard event as one line on stdout.
#[derive(Clone, Default)]
pub struct ConsoleDashboardSink;

impl DashboardSink for ConsoleDashboardSink {
    fn emit(&self, event: DashboardEvent) {
        tracing::debug!(
            "Dashboard event: {}",
            serde_json::to_string(&event).unwrap_or_default()
        );
        let line = match &event {
            DashboardEvent::PriceUpdated(status) => format_price_status(status),
            DashboardEvent::HalvingUpdated(status) => format_halving_status(status, Utc::now()),
        };
        println!("{}", line);
    }
}
