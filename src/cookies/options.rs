//! Cookie options.
//!
//! [`CookieOptions`] is the fully resolved option set used when a cookie is written.
//! [`PartialCookieOptions`] is what callers hand around: every field is optional and
//! only the fields that are set override the configured defaults (see
//! [`PartialCookieOptions::merge_over`]).
//!
//! The default encoder/decoder behave like JavaScript's `encodeURIComponent` and
//! `decodeURIComponent`, so cookies written by browser code and by this crate agree
//! on their wire form.

use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Encodes a single cookie field (value) for the wire.
///
/// An `Err` makes the codec fall back to the unencoded text for that field.
pub type Encoder = fn(&str) -> anyhow::Result<String>;

/// Decodes a single cookie field (key or value) coming off the wire.
///
/// An `Err` makes the codec fall back to the raw text for that field.
pub type Decoder = fn(&str) -> anyhow::Result<String>;

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn default_encode(value: &str) -> anyhow::Result<String> {
    Ok(utf8_percent_encode(value, URI_COMPONENT).to_string())
}

/// Percent-decodes `value`.
///
/// Fails on a `%` that is not followed by two hex digits, or when the decoded bytes are
/// not valid UTF-8.
pub fn default_decode(value: &str) -> anyhow::Result<String> {
    let bytes = value.as_bytes();
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|b| *b == b'%') {
        let at = pos + offset;
        match bytes.get(at + 1..at + 3) {
            Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => pos = at + 3,
            _ => anyhow::bail!("malformed percent escape at byte {at}"),
        }
    }

    Ok(percent_decode_str(value).decode_utf8()?.into_owned())
}

/// SameSite policy (`"Strict"`, `"Lax"`, or `"None"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SameSite {
    /// Cookie only sent to same-site requests
    Strict,
    /// Cookie sent to same-site requests and top-level navigations
    Lax,
    /// Cookie sent to all requests
    #[default]
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => f.write_str("Strict"),
            SameSite::Lax => f.write_str("Lax"),
            SameSite::None => f.write_str("None"),
        }
    }
}

/// Fully resolved cookie options.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    /// Domain scoping. Host-only when `None`.
    pub domain: Option<String>,

    /// Path scoping (default `"/"`).
    pub path: String,

    /// Emit the `HttpOnly` flag.
    pub http_only: bool,

    /// Emit the `Secure` flag.
    pub secure: bool,

    /// Carried through for the signing layer. The codec never signs.
    pub signed: bool,

    /// Emitted as `SameSite=<policy>`.
    pub same_site: SameSite,

    /// Lifetime in **milliseconds**. Takes precedence over `expires`.
    pub max_age: Option<f64>,

    /// Absolute expiration. Ignored when `max_age` is set.
    pub expires: Option<OffsetDateTime>,

    pub encode: Encoder,
    pub decode: Decoder,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            domain: None,
            path: "/".to_string(),
            http_only: false,
            secure: false,
            signed: false,
            same_site: SameSite::None,
            max_age: None,
            expires: None,
            encode: default_encode,
            decode: default_decode,
        }
    }
}

/// Cookie options where every field is optional.
///
/// Unset fields are taken from the defaults when merged, and are left out of the
/// `Set-Cookie` line when passed to the codec directly.
///
/// Deserializes from JSON using camelCase keys (`httpOnly`, `sameSite`, `maxAge`, ...);
/// `expires` is an RFC 3339 timestamp. The encoder and decoder can only be set from code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialCookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    pub signed: Option<bool>,
    pub same_site: Option<SameSite>,
    pub max_age: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
    #[serde(skip)]
    pub encode: Option<Encoder>,
    #[serde(skip)]
    pub decode: Option<Decoder>,
}

impl PartialCookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlays the fields set on `self` onto `defaults`.
    pub fn merge_over(&self, defaults: &CookieOptions) -> CookieOptions {
        CookieOptions {
            domain: self.domain.clone().or_else(|| defaults.domain.clone()),
            path: self.path.clone().unwrap_or_else(|| defaults.path.clone()),
            http_only: self.http_only.unwrap_or(defaults.http_only),
            secure: self.secure.unwrap_or(defaults.secure),
            signed: self.signed.unwrap_or(defaults.signed),
            same_site: self.same_site.unwrap_or(defaults.same_site),
            max_age: self.max_age.or(defaults.max_age),
            expires: self.expires.or(defaults.expires),
            encode: self.encode.unwrap_or(defaults.encode),
            decode: self.decode.unwrap_or(defaults.decode),
        }
    }

    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = Some(on);
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = Some(on);
        self
    }

    pub fn signed(mut self, on: bool) -> Self {
        self.signed = Some(on);
        self
    }

    pub fn same_site(mut self, policy: SameSite) -> Self {
        self.same_site = Some(policy);
        self
    }

    /// Lifetime in milliseconds.
    pub fn max_age(mut self, millis: f64) -> Self {
        self.max_age = Some(millis);
        self
    }

    pub fn expires(mut self, at: OffsetDateTime) -> Self {
        self.expires = Some(at);
        self
    }

    pub fn encode(mut self, encode: Encoder) -> Self {
        self.encode = Some(encode);
        self
    }

    pub fn decode(mut self, decode: Decoder) -> Self {
        self.decode = Some(decode);
        self
    }
}

impl From<CookieOptions> for PartialCookieOptions {
    fn from(options: CookieOptions) -> Self {
        Self {
            domain: options.domain,
            path: Some(options.path),
            http_only: Some(options.http_only),
            secure: Some(options.secure),
            signed: Some(options.signed),
            same_site: Some(options.same_site),
            max_age: options.max_age,
            expires: options.expires,
            encode: Some(options.encode),
            decode: Some(options.decode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn defaults_match_documented_set() {
        let opts = CookieOptions::default();
        assert_eq!(opts.path, "/");
        assert!(opts.domain.is_none());
        assert!(!opts.http_only);
        assert!(!opts.secure);
        assert!(!opts.signed);
        assert_eq!(opts.same_site, SameSite::None);
        assert!(opts.max_age.is_none());
        assert!(opts.expires.is_none());
    }

    #[test]
    fn encode_leaves_uri_component_marks_alone() {
        assert_eq!(default_encode("AZaz09-_.!~*'()").unwrap(), "AZaz09-_.!~*'()");
        assert_eq!(default_encode("a b;c=d").unwrap(), "a%20b%3Bc%3Dd");
        assert_eq!(default_encode("{\"a\":1}").unwrap(), "%7B%22a%22%3A1%7D");
        assert_eq!(default_encode("é").unwrap(), "%C3%A9");
    }

    #[test]
    fn decode_rejects_malformed_escapes() {
        assert_eq!(default_decode("a%20b").unwrap(), "a b");
        assert_eq!(default_decode("%C3%A9").unwrap(), "é");
        assert!(default_decode("%zz").is_err());
        assert!(default_decode("trailing%").is_err());
        assert!(default_decode("%4").is_err());
        // lone continuation byte is not UTF-8
        assert!(default_decode("%80").is_err());
    }

    #[test]
    fn merge_only_overrides_set_fields() {
        let defaults = CookieOptions {
            domain: Some("example.com".into()),
            secure: true,
            ..CookieOptions::default()
        };

        let merged = PartialCookieOptions::new()
            .path("/api")
            .same_site(SameSite::Lax)
            .merge_over(&defaults);

        assert_eq!(merged.domain.as_deref(), Some("example.com"));
        assert_eq!(merged.path, "/api");
        assert!(merged.secure);
        assert!(!merged.http_only);
        assert_eq!(merged.same_site, SameSite::Lax);
    }

    #[test]
    fn merge_can_switch_flags_off() {
        let defaults = CookieOptions {
            http_only: true,
            ..CookieOptions::default()
        };
        let merged = PartialCookieOptions::new().http_only(false).merge_over(&defaults);
        assert!(!merged.http_only);
    }

    #[test]
    fn partial_options_from_json() {
        let json = r#"{
            "domain": "example.com",
            "httpOnly": true,
            "sameSite": "Strict",
            "maxAge": 60000,
            "expires": "2030-01-01T00:00:00Z"
        }"#;
        let opts: PartialCookieOptions = serde_json::from_str(json).unwrap();

        assert_eq!(opts.domain.as_deref(), Some("example.com"));
        assert_eq!(opts.http_only, Some(true));
        assert_eq!(opts.same_site, Some(SameSite::Strict));
        assert_eq!(opts.max_age, Some(60000.0));
        assert_eq!(opts.expires, Some(datetime!(2030-01-01 0:00 UTC)));
        assert!(opts.path.is_none());
        assert!(opts.encode.is_none());
    }

    #[test]
    fn same_site_display() {
        assert_eq!(SameSite::Strict.to_string(), "Strict");
        assert_eq!(SameSite::Lax.to_string(), "Lax");
        assert_eq!(SameSite::None.to_string(), "None");
    }
}
