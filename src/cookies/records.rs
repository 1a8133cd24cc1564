//! Cookie records queued by handlers.
//!
//! A record describes a cookie the handler wants written to (or removed from) the
//! outgoing response. Records only carry *partial* options: they are merged over the
//! configured defaults right before serialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cookies::options::PartialCookieOptions;

/// A cookie to set on the outgoing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSetRecord {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Cookie value. Strings are written as-is, anything else as JSON text.
    pub value: Value,

    #[serde(default)]
    pub options: PartialCookieOptions,
}

impl CookieSetRecord {
    pub fn new<N: Into<String>, V: Into<Value>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options: PartialCookieOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PartialCookieOptions) -> Self {
        self.options = options;
        self
    }
}

/// A cookie to invalidate on the client.
///
/// Removal is written as an empty value with `Max-Age=0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieRemoveRecord {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Must match the domain/path the cookie was set with, or the client keeps it.
    #[serde(default)]
    pub options: PartialCookieOptions,
}

impl CookieRemoveRecord {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            options: PartialCookieOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PartialCookieOptions) -> Self {
        self.options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_record_accepts_any_json_value() {
        let r = CookieSetRecord::new("theme", "dark");
        assert_eq!(r.value, json!("dark"));

        let r = CookieSetRecord::new("prefs", json!({"lang": "nl"}));
        assert_eq!(r.value, json!({"lang": "nl"}));
        assert!(r.options.path.is_none());
    }

    #[test]
    fn records_from_json() {
        let set: CookieSetRecord = serde_json::from_str(
            r#"{"name": "a", "value": 1, "options": {"path": "/x", "secure": true}}"#,
        )
        .unwrap();
        assert_eq!(set.name, "a");
        assert_eq!(set.value, json!(1));
        assert_eq!(set.options.path.as_deref(), Some("/x"));
        assert_eq!(set.options.secure, Some(true));

        let remove: CookieRemoveRecord = serde_json::from_str(r#"{"name": "b"}"#).unwrap();
        assert_eq!(remove.name, "b");
        assert!(remove.options.max_age.is_none());
    }
}
