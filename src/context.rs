//! Per-request cookie context.
//!
//! A [`CookieContext`] is created for every request by the
//! [`CookieInterceptor`](crate::interceptor::CookieInterceptor). It exposes the parsed
//! request cookies to the handler and collects the cookies the handler wants to set or
//! remove. After the handler returns, the interceptor drains the pending records with
//! [`CookieContext::take_pending`] and writes them to the response.
//!
//! ```rust
//! use gosub_cookies::{CookieConfig, CookieContext};
//! use gosub_cookies::cookies::PartialCookieOptions;
//!
//! let mut ctx = CookieContext::from_header("session=abc", &CookieConfig::default());
//! assert_eq!(ctx.get("session").unwrap(), "abc");
//!
//! ctx.set_cookie("theme", "dark", PartialCookieOptions::new());
//! ctx.remove_cookie("session", PartialCookieOptions::new());
//!
//! let pending = ctx.take_pending();
//! assert_eq!(pending.set.len(), 1);
//! assert_eq!(pending.remove.len(), 1);
//! assert!(ctx.pending().is_empty());
//! ```

use serde_json::Value;

use crate::config::CookieConfig;
use crate::cookies::{CookieCodec, CookieMap, CookieRemoveRecord, CookieSetRecord, PartialCookieOptions};

/// Cookie records waiting to be written to a response.
#[derive(Debug, Clone, Default)]
pub struct PendingCookies {
    pub set: Vec<CookieSetRecord>,
    pub remove: Vec<CookieRemoveRecord>,
}

impl PendingCookies {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.len() + self.remove.len()
    }
}

/// Request cookies plus the set/remove records queued while handling the request.
#[derive(Debug, Default)]
pub struct CookieContext {
    /// Cookies parsed from the request `Cookie` header
    cookies: CookieMap,
    /// Records to write once the handler succeeds
    pending: PendingCookies,
}

impl CookieContext {
    pub fn new(cookies: CookieMap) -> Self {
        Self {
            cookies,
            pending: PendingCookies::default(),
        }
    }

    /// Parses `raw` with the decoder configured in `config`.
    pub fn from_header(raw: &str, config: &CookieConfig) -> Self {
        Self::new(CookieCodec::new().parse(raw, Some(config.decoder())))
    }

    /// All request cookies.
    pub fn cookies(&self) -> &CookieMap {
        &self.cookies
    }

    /// A single request cookie by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cookies.get(name)
    }

    /// Queues a cookie to be set on the response.
    pub fn set_cookie<N: Into<String>, V: Into<Value>>(&mut self, name: N, value: V, options: PartialCookieOptions) {
        self.pending
            .set
            .push(CookieSetRecord::new(name, value).with_options(options));
    }

    /// Queues a cookie to be removed on the client.
    pub fn remove_cookie<N: Into<String>>(&mut self, name: N, options: PartialCookieOptions) {
        self.pending
            .remove
            .push(CookieRemoveRecord::new(name).with_options(options));
    }

    /// Replaces the queued set records. Later `set_cookie` calls append to `records`.
    pub fn stage_set(&mut self, records: Vec<CookieSetRecord>) {
        self.pending.set = records;
    }

    /// Replaces the queued remove records. Later `remove_cookie` calls append to `records`.
    pub fn stage_remove(&mut self, records: Vec<CookieRemoveRecord>) {
        self.pending.remove = records;
    }

    pub fn pending(&self) -> &PendingCookies {
        &self.pending
    }

    /// Takes all pending records, leaving the context with none.
    pub fn take_pending(&mut self) -> PendingCookies {
        std::mem::take(&mut self.pending)
    }
}
