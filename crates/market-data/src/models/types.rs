use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Lowercase currency code (ISO 4217-like, e.g. "usd", "eur")
pub type Currency = Cow<'static, str>;

/// Normalize a user- or config-supplied currency code to the lowercase form
/// used by providers and cache keys.
pub fn normalize_currency(code: &str) -> Currency {
    Cow::Owned(code.trim().to_ascii_lowercase())
}
