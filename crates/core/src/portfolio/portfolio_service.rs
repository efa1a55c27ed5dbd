use std::sync::Arc;

use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};

use super::portfolio_model::{EntryValuation, NewPortfolioEntry, PortfolioEntry};
use super::portfolio_traits::PortfolioServiceTrait;
use crate::calculators::{checked_mul, checked_sub};
use crate::constants::{
    BTC_DECIMAL_PRECISION, DEFAULT_HEADLINE_CURRENCY, FIAT_DECIMAL_PRECISION, PORTFOLIO_KEY,
};
use crate::context::PriceContext;
use crate::errors::{Error, Result, ValidationError};
use crate::kv::KeyValueStore;

const CSV_HEADER: [&str; 4] = ["BTC", "Buy Price", "Currency", "Exchange"];

/// Portfolio rows persisted as one JSON array.
pub struct PortfolioService {
    store: Arc<dyn KeyValueStore>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn save(&self, entries: &[PortfolioEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(PORTFOLIO_KEY, &json)
    }
}

fn round(value: Decimal, dp: u32) -> Decimal {
    value
        .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

impl PortfolioServiceTrait for PortfolioService {
    /// Stored rows. Unreadable data reads as an empty portfolio.
    fn entries(&self) -> Result<Vec<PortfolioEntry>> {
        let Some(raw) = self.store.get(PORTFOLIO_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Ignoring unreadable portfolio data: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn add(&self, new_entry: NewPortfolioEntry) -> Result<PortfolioEntry> {
        if new_entry.btc <= Decimal::ZERO {
            return Err(ValidationError::not_positive("btc").into());
        }
        if new_entry.buy < Decimal::ZERO {
            return Err(ValidationError::negative("buy price").into());
        }

        let fiat = new_entry.fiat.trim().to_ascii_lowercase();
        let entry = PortfolioEntry {
            btc: round(new_entry.btc, BTC_DECIMAL_PRECISION),
            buy: round(new_entry.buy, FIAT_DECIMAL_PRECISION),
            fiat: if fiat.is_empty() {
                DEFAULT_HEADLINE_CURRENCY.to_string()
            } else {
                fiat
            },
            exchange: new_entry
                .exchange
                .map(|e| e.trim().to_string())
                .unwrap_or_default(),
        };
        if entry.btc.is_zero() {
            return Err(ValidationError::not_positive("btc").into());
        }
        checked_mul(entry.btc, entry.buy, "invested amount")?;

        let mut entries = self.entries()?;
        entries.push(entry.clone());
        self.save(&entries)?;
        debug!("Added portfolio entry #{}", entries.len() - 1);
        Ok(entry)
    }

    fn remove(&self, index: usize) -> Result<PortfolioEntry> {
        let mut entries = self.entries()?;
        if index >= entries.len() {
            return Err(ValidationError::NoSuchEntry(index).into());
        }
        let removed = entries.remove(index);
        self.save(&entries)?;
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(PORTFOLIO_KEY)
    }

    fn export_csv(&self) -> Result<String> {
        let entries = self.entries()?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for entry in &entries {
            writer.write_record([
                entry.btc.normalize().to_string(),
                entry.buy.normalize().to_string(),
                entry.fiat.to_ascii_uppercase(),
                entry.exchange.clone(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::Csv(e.to_string()))
    }

    fn valuation(&self, context: &PriceContext) -> Result<Vec<EntryValuation>> {
        let entries = self.entries()?;
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let invested = checked_mul(entry.btc, entry.buy, "invested amount")?;
                let current = context
                    .rate_or_headline(&entry.fiat)
                    .map(|rate| checked_mul(entry.btc, rate, "current value"))
                    .transpose()?;
                let profit_loss = current
                    .map(|value| checked_sub(value, invested, "profit/loss"))
                    .transpose()?;
                Ok(EntryValuation {
                    index,
                    invested,
                    current,
                    profit_loss,
                    entry,
                })
            })
            .collect()
    }
}
