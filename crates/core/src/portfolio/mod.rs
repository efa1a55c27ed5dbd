//! Portfolio module - user-entered holdings, CSV export and valuation.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

pub use portfolio_model::{EntryValuation, NewPortfolioEntry, PortfolioEntry};
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::PortfolioServiceTrait;
