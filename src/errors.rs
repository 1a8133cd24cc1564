/// Errors raised by the cookie codec.
///
/// Only malformed *configuration* ends up here. Malformed cookie data is recovered
/// locally by the codec (pairs are dropped, raw text is kept) and never surfaces as an
/// error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CookieError {
    /// A numeric or date-like option does not have the expected shape.
    #[error("Type constraint violated: {0}")]
    TypeConstraint(String),

    /// A name, domain or path contains characters outside the field-content grammar.
    #[error("Range constraint violated: {0}")]
    RangeConstraint(String),
}
