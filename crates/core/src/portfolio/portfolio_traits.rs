use super::portfolio_model::{EntryValuation, NewPortfolioEntry, PortfolioEntry};
use crate::context::PriceContext;
use crate::errors::Result;

/// Trait defining the contract for portfolio tracking operations.
pub trait PortfolioServiceTrait: Send + Sync {
    fn entries(&self) -> Result<Vec<PortfolioEntry>>;

    fn add(&self, new_entry: NewPortfolioEntry) -> Result<PortfolioEntry>;

    /// Remove the entry at `index`, returning it.
    fn remove(&self, index: usize) -> Result<PortfolioEntry>;

    fn clear(&self) -> Result<()>;

    /// CSV with header `BTC,Buy Price,Currency,Exchange`.
    fn export_csv(&self) -> Result<String>;

    fn valuation(&self, context: &PriceContext) -> Result<Vec<EntryValuation>>;
}
