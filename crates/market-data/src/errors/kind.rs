/// Coarse classification of a [`PriceError`](super::PriceError).
///
/// | Kind | Counts as an attempt? | Next step |
/// |------|-----------------------|-----------|
/// | `Transport` | Yes | Retry, then next provider |
/// | `Shape` | Yes | Retry, then next provider |
/// | `Unsupported` | No | Provider is skipped |
/// | `AllSourcesUnavailable` | - | Caller falls back to cache |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Network failure, non-2xx status, or timeout.
    Transport,

    /// The body parsed but lacked the expected field, or held a non-positive value.
    Shape,

    /// The provider cannot serve this request at all.
    /// Retrying the same provider would not help.
    Unsupported,

    /// Every eligible provider exhausted its attempts.
    AllSourcesUnavailable,
}
