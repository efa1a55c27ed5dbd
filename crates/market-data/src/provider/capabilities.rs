//! Provider capabilities.
//!
//! Describes what a price provider can serve so the resolver can skip
//! providers that would never succeed for a request.

/// Currencies a provider can quote Bitcoin in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurrencyCoverage {
    /// Any currency the upstream knows about.
    Any,
    /// A fixed list of lowercase currency codes.
    Only(&'static [&'static str]),
}

impl CurrencyCoverage {
    /// Whether `currency` (lowercase) is covered.
    pub fn covers(&self, currency: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(codes) => codes.contains(&currency),
        }
    }
}

/// Describes the capabilities of a price provider.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Currencies this provider can quote.
    pub currencies: CurrencyCoverage,

    /// Whether one request can return rates for several currencies.
    pub supports_batch: bool,

    /// Whether the provider serves a daily price history.
    pub supports_history: bool,
}
