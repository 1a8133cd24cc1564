//! Cookie codec.
//!
//! Converts a raw `Cookie` request header into a [`CookieMap`], and a
//! name/value/options triple into a `Set-Cookie` header value.
//!
//! ## Parsing
//! Parsing is best-effort and never fails:
//! - pairs are separated by `;`, key and value by the first `=`, whitespace around
//!   both separators is ignored;
//! - keys and values are decoded independently, a field that fails to decode is kept
//!   as raw text;
//! - pairs whose key or value is empty after trimming are dropped;
//! - values are JSON-decoded when possible (a leading `j:` before `[` or `{` is
//!   stripped first), otherwise kept as strings;
//! - duplicate keys: last one wins.
//!
//! ## Serializing
//! Only configuration errors are reported: an invalid name/domain/path yields
//! [`CookieError::RangeConstraint`], an unusable `max_age`/`expires` yields
//! [`CookieError::TypeConstraint`]. Attributes are always written in the order
//! `Domain`, `Path`, `Max-Age`, `Expires`, `HttpOnly`, `Secure`, `SameSite`.
//!
//! ```rust
//! use gosub_cookies::cookies::{CookieCodec, PartialCookieOptions, SameSite};
//!
//! let codec = CookieCodec::new();
//! let line = codec.serialize(
//!     "id",
//!     &"abc123".into(),
//!     &PartialCookieOptions::new()
//!         .path("/")
//!         .http_only(true)
//!         .secure(true)
//!         .same_site(SameSite::Strict),
//! ).unwrap();
//! assert_eq!(line, "id=abc123; Path=/; HttpOnly; Secure; SameSite=Strict");
//!
//! let cookies = codec.parse("foo=bar; baz=qux", None);
//! assert_eq!(cookies["foo"], "bar");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Write;

use serde_json::Value;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::cookies::options::{default_decode, default_encode, Decoder, Encoder, PartialCookieOptions};
use crate::errors::CookieError;

/// Parsed request cookies, keyed by (decoded) cookie name.
pub type CookieMap = HashMap<String, Value>;

/// Largest offset from "now" accepted for `max_age`, in milliseconds (100 million days).
const MAX_AGE_LIMIT_MS: f64 = 8.64e15;

/// Stateless cookie parser and serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieCodec;

impl CookieCodec {
    /// Name of the response header carrying serialized cookies.
    pub const HEADER_NAME: &'static str = "Set-Cookie";

    pub fn new() -> Self {
        Self
    }

    /// Parses a raw `Cookie` header into a map of cookie values.
    ///
    /// `decode` defaults to [`default_decode`].
    pub fn parse(&self, raw: &str, decode: Option<Decoder>) -> CookieMap {
        let decode = decode.unwrap_or(default_decode);
        let mut cookies = CookieMap::new();

        if raw.is_empty() {
            return cookies;
        }

        for pair in raw.split(';') {
            let (raw_key, raw_value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (pair.trim(), ""),
            };

            let key = decode_field(raw_key, decode);
            let value = decode_field(raw_value, decode);
            let (key, value) = (key.trim(), value.trim());

            if key.is_empty() || value.is_empty() {
                log::debug!("Dropping cookie pair {pair:?}: empty name or value");
                continue;
            }

            cookies.insert(key.to_string(), json_value(value));
        }

        cookies
    }

    /// Serializes a cookie into a `Set-Cookie` header value.
    ///
    /// String values are encoded as-is, any other JSON value is stringified first.
    /// Only the attributes present in `options` are written.
    pub fn serialize(
        &self,
        name: &str,
        value: &Value,
        options: &PartialCookieOptions,
    ) -> Result<String, CookieError> {
        let encode = options.encode.unwrap_or(default_encode);

        if !is_field_content(name) {
            return Err(CookieError::RangeConstraint(
                "Argument \"name\" has an invalid value".into(),
            ));
        }

        let text: Cow<'_, str> = match value {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(serde_json::to_string(other).map_err(|e| {
                CookieError::TypeConstraint(format!("Argument \"value\" cannot be stringified: {e}"))
            })?),
        };

        let mut cookie = format!("{name}={}", encode_field(&text, encode));

        if let Some(domain) = &options.domain {
            if !is_field_content(domain) {
                return Err(CookieError::RangeConstraint(
                    "Option \"domain\" has an invalid value".into(),
                ));
            }
            let _ = write!(cookie, "; Domain={domain}");
        }

        if let Some(path) = &options.path {
            if !is_field_content(path) {
                return Err(CookieError::RangeConstraint(
                    "Option \"path\" has an invalid value".into(),
                ));
            }
            let _ = write!(cookie, "; Path={path}");
        }

        if let Some(max_age) = options.max_age {
            if !max_age.is_finite() {
                return Err(CookieError::TypeConstraint(
                    "Option \"maxAge\" must be a finite number".into(),
                ));
            }

            let expires = utc_string(expires_after(max_age)?)?;
            let _ = write!(cookie, "; Max-Age={}", max_age.floor() as i64);
            let _ = write!(cookie, "; Expires={expires}");
        } else if let Some(expires) = options.expires {
            let _ = write!(cookie, "; Expires={}", utc_string(expires)?);
        }

        if options.http_only.unwrap_or(false) {
            cookie.push_str("; HttpOnly");
        }

        if options.secure.unwrap_or(false) {
            cookie.push_str("; Secure");
        }

        if let Some(same_site) = options.same_site {
            let _ = write!(cookie, "; SameSite={same_site}");
        }

        Ok(cookie)
    }
}

/// Returns true when `value` is non-empty and only holds tab, printable ASCII or
/// Latin-1 characters, excluding `;` and `,`.
pub fn is_field_content(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            matches!(c, '\t' | '\u{20}'..='\u{7e}' | '\u{80}'..='\u{ff}') && c != ';' && c != ','
        })
}

fn decode_field<'a>(raw: &'a str, decode: Decoder) -> Cow<'a, str> {
    match decode(raw) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(e) => {
            log::trace!("Cannot decode cookie field {raw:?}, keeping raw text: {e}");
            Cow::Borrowed(raw)
        }
    }
}

fn encode_field<'a>(text: &'a str, encode: Encoder) -> Cow<'a, str> {
    match encode(text) {
        Ok(encoded) => Cow::Owned(encoded),
        Err(e) => {
            log::trace!("Cannot encode cookie field, keeping plain text: {e}");
            Cow::Borrowed(text)
        }
    }
}

/// JSON-decodes a cookie value, falling back to the string itself.
fn json_value(value: &str) -> Value {
    let candidate = match value.strip_prefix("j:") {
        Some(rest) if rest.starts_with(['[', '{']) => rest,
        _ => value,
    };

    serde_json::from_str(candidate).unwrap_or_else(|_| Value::String(candidate.to_string()))
}

/// Moment `max_age` milliseconds from now.
fn expires_after(max_age: f64) -> Result<OffsetDateTime, CookieError> {
    let out_of_range =
        || CookieError::TypeConstraint(format!("Option \"maxAge\" is out of range: {max_age}"));

    if max_age.abs() > MAX_AGE_LIMIT_MS {
        return Err(out_of_range());
    }

    OffsetDateTime::now_utc()
        .checked_add(Duration::milliseconds(max_age.trunc() as i64))
        .ok_or_else(out_of_range)
}

/// Formats `at` as an RFC 1123 date, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
pub fn utc_string(at: OffsetDateTime) -> Result<String, CookieError> {
    let invalid = |e: &dyn std::fmt::Display| {
        CookieError::TypeConstraint(format!("Option \"expires\" must be a valid date: {e}"))
    };

    // going through the timestamp keeps dates whose UTC form is out of range from panicking
    OffsetDateTime::from_unix_timestamp(at.unix_timestamp())
        .map_err(|e| invalid(&e))?
        .format(format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ))
        .map_err(|e| invalid(&e))
}
