//! Cookie configuration.
//!
//! `CookieConfig` holds the default option set every outgoing cookie is merged over,
//! and the decoder used for incoming `Cookie` headers. It is built once at startup and
//! shared (usually behind an `Arc`) with the [`CookieInterceptor`](crate::interceptor::CookieInterceptor).
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_cookies::CookieConfig;
//! let cfg = CookieConfig::default();
//! assert_eq!(cfg.defaults.path, "/");
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_cookies::CookieConfig;
//! use gosub_cookies::cookies::SameSite;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CookieConfig::builder()
//!     .domain("example.com")
//!     .http_only(true)
//!     .secure(true)
//!     .same_site(SameSite::Lax)
//!     .build()?; // returns Result<CookieConfig, CookieError>
//! # Ok(()) }
//! ```
//!
//! ## Load from JSON
//! ```rust
//! use gosub_cookies::CookieConfig;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = CookieConfig::from_json_str(r#"{ "secure": true, "sameSite": "Strict" }"#)?;
//! assert!(cfg.defaults.secure);
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Validation returns [`CookieError`] when the default domain or path is outside the
//! cookie field-content grammar, or when the default `max_age` is not a finite number.

use crate::cookies::{
    is_field_content, CookieOptions, Decoder, Encoder, PartialCookieOptions, SameSite,
};
use crate::errors::CookieError;
use time::OffsetDateTime;

/// Module-wide cookie configuration.
#[derive(Debug, Clone, Default)]
pub struct CookieConfig {
    /// Options every outgoing cookie is merged over.
    pub defaults: CookieOptions,
}

impl CookieConfig {
    pub fn builder() -> CookieConfigBuilder {
        CookieConfigBuilder::default()
    }

    /// Overlays `options` on the built-in defaults and validates the result.
    pub fn register(options: PartialCookieOptions) -> Result<Self, CookieError> {
        let config = Self {
            defaults: options.merge_over(&CookieOptions::default()),
        };
        validate(&config)?;
        Ok(config)
    }

    /// Reads a JSON [`PartialCookieOptions`] document and registers it.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let options: PartialCookieOptions = serde_json::from_str(json)?;
        Ok(Self::register(options)?)
    }

    /// Decoder applied to incoming `Cookie` headers.
    #[inline]
    pub fn decoder(&self) -> Decoder {
        self.defaults.decode
    }

    /// Resolves a record's options against the configured defaults.
    #[inline]
    pub fn merge(&self, options: &PartialCookieOptions) -> CookieOptions {
        options.merge_over(&self.defaults)
    }
}

/// Builder for [`CookieConfig`], mirroring `ZoneConfigBuilder`.
#[derive(Debug, Clone, Default)]
pub struct CookieConfigBuilder {
    inner: CookieConfig,
}

impl CookieConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieOptions)) -> Self {
        f(&mut self.inner.defaults);
        self
    }

    pub fn domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.domain = Some(domain.into())) }
    pub fn path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.path = path.into()) }
    pub fn http_only(self, on: bool) -> Self { self.map(|c| c.http_only = on) }
    pub fn secure(self, on: bool) -> Self { self.map(|c| c.secure = on) }
    pub fn signed(self, on: bool) -> Self { self.map(|c| c.signed = on) }
    pub fn same_site(self, policy: SameSite) -> Self { self.map(|c| c.same_site = policy) }
    pub fn max_age(self, millis: f64) -> Self { self.map(|c| c.max_age = Some(millis)) }
    pub fn expires(self, at: OffsetDateTime) -> Self { self.map(|c| c.expires = Some(at)) }
    pub fn encode(self, encode: Encoder) -> Self { self.map(|c| c.encode = encode) }
    pub fn decode(self, decode: Decoder) -> Self { self.map(|c| c.decode = decode) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CookieOptions)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<CookieConfig, CookieError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

fn validate(c: &CookieConfig) -> Result<(), CookieError> {
    if let Some(domain) = &c.defaults.domain {
        if !is_field_content(domain) {
            return Err(CookieError::RangeConstraint(format!(
                "default domain {domain:?} has an invalid value"
            )));
        }
    }
    if !is_field_content(&c.defaults.path) {
        return Err(CookieError::RangeConstraint(format!(
            "default path {:?} has an invalid value",
            c.defaults.path
        )));
    }
    if let Some(max_age) = c.defaults.max_age {
        if !max_age.is_finite() {
            return Err(CookieError::TypeConstraint(format!(
                "default maxAge {max_age} must be a finite number"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_defaults() {
        let cfg = CookieConfig::builder()
            .domain("example.com")
            .path("/app")
            .http_only(true)
            .signed(true)
            .same_site(SameSite::Strict)
            .build()
            .unwrap();

        assert_eq!(cfg.defaults.domain.as_deref(), Some("example.com"));
        assert_eq!(cfg.defaults.path, "/app");
        assert!(cfg.defaults.http_only);
        assert!(cfg.defaults.signed);
        assert!(!cfg.defaults.secure);
        assert_eq!(cfg.defaults.same_site, SameSite::Strict);
    }

    #[test]
    fn builder_with_applies_closure() {
        let cfg = CookieConfig::builder()
            .with(|c| {
                c.secure = true;
                c.max_age = Some(1000.0);
            })
            .build()
            .unwrap();
        assert!(cfg.defaults.secure);
        assert_eq!(cfg.defaults.max_age, Some(1000.0));
    }

    #[test]
    fn builder_rejects_bad_values() {
        let err = CookieConfig::builder().path("").build().unwrap_err();
        assert!(matches!(err, CookieError::RangeConstraint(_)));

        let err = CookieConfig::builder().domain("a,b").build().unwrap_err();
        assert!(matches!(err, CookieError::RangeConstraint(_)));

        let err = CookieConfig::builder().max_age(f64::NAN).build().unwrap_err();
        assert!(matches!(err, CookieError::TypeConstraint(_)));
    }

    #[test]
    fn register_overlays_partial_options() {
        let cfg = CookieConfig::register(PartialCookieOptions::new().secure(true)).unwrap();
        assert!(cfg.defaults.secure);
        assert_eq!(cfg.defaults.path, "/");
        assert_eq!(cfg.defaults.same_site, SameSite::None);
    }

    #[test]
    fn from_json_str_reads_camel_case() {
        let cfg = CookieConfig::from_json_str(
            r#"{ "domain": "example.com", "httpOnly": true, "sameSite": "Lax" }"#,
        )
        .unwrap();
        assert_eq!(cfg.defaults.domain.as_deref(), Some("example.com"));
        assert!(cfg.defaults.http_only);
        assert_eq!(cfg.defaults.same_site, SameSite::Lax);

        assert!(CookieConfig::from_json_str("not json").is_err());
        assert!(CookieConfig::from_json_str(r#"{ "path": "a;b" }"#).is_err());
    }

    #[test]
    fn merge_resolves_against_defaults() {
        let cfg = CookieConfig::builder().secure(true).build().unwrap();
        let merged = cfg.merge(&PartialCookieOptions::new().path("/x"));
        assert!(merged.secure);
        assert_eq!(merged.path, "/x");
    }
}
