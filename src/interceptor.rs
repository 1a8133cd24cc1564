//! Cookie interceptor.
//!
//! Sits around a route handler:
//! 1. parses the request `Cookie` header(s) into a [`CookieContext`];
//! 2. runs the handler with that context;
//! 3. when the handler succeeds, serializes every pending set record, then every
//!    pending remove record, and appends one `Set-Cookie` header per record to the
//!    response headers.
//!
//! When the handler fails, pending records are discarded and nothing is written.
//! A record that cannot be serialized (invalid name, domain, ...) is logged and
//! skipped; the remaining records are still written.
//!
//! The interceptor works on plain [`http::HeaderMap`]s and is not tied to any web
//! framework.
//!
//! ```rust
//! use std::sync::Arc;
//! use gosub_cookies::{CookieConfig, CookieInterceptor};
//! use gosub_cookies::cookies::PartialCookieOptions;
//! use http::header::{COOKIE, SET_COOKIE};
//! use http::HeaderMap;
//!
//! # fn main() -> anyhow::Result<()> {
//! let interceptor = CookieInterceptor::new(Arc::new(CookieConfig::default()));
//!
//! let mut request = HeaderMap::new();
//! request.insert(COOKIE, "visits=1".parse()?);
//! let mut response = HeaderMap::new();
//!
//! let visits = interceptor.intercept(&request, &mut response, |ctx| {
//!     let visits = ctx.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
//!     ctx.set_cookie("visits", visits, PartialCookieOptions::new());
//!     Ok(visits)
//! })?;
//!
//! assert_eq!(visits, 2);
//! assert_eq!(response[SET_COOKIE], "visits=2; Path=/; SameSite=None");
//! # Ok(()) }
//! ```

use std::sync::Arc;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue};
use serde_json::Value;

use crate::config::CookieConfig;
use crate::context::{CookieContext, PendingCookies};
use crate::cookies::{CookieCodec, CookieOptions};

/// Reads request cookies and writes queued cookies around a handler invocation.
#[derive(Debug, Clone)]
pub struct CookieInterceptor {
    config: Arc<CookieConfig>,
    codec: CookieCodec,
}

impl CookieInterceptor {
    pub fn new(config: Arc<CookieConfig>) -> Self {
        Self {
            config,
            codec: CookieCodec::new(),
        }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Builds the context for a request.
    ///
    /// Multiple `Cookie` headers are joined with `"; "`. A missing header yields an
    /// empty context.
    pub fn request_context(&self, request: &HeaderMap) -> CookieContext {
        let raw = request
            .get_all(COOKIE)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
            .collect::<Vec<_>>()
            .join("; ");

        CookieContext::new(self.codec.parse(&raw, Some(self.config.decoder())))
    }

    /// Runs `handler` with the request cookies and writes its queued cookies to
    /// `response` when it succeeds.
    pub fn intercept<T, F>(&self, request: &HeaderMap, response: &mut HeaderMap, handler: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut CookieContext) -> anyhow::Result<T>,
    {
        let mut ctx = self.request_context(request);
        let result = handler(&mut ctx);
        let pending = ctx.take_pending();

        match result {
            Ok(value) => {
                self.write_pending(pending, response);
                Ok(value)
            }
            Err(e) => {
                if !pending.is_empty() {
                    log::debug!("Handler failed, discarding {} pending cookie(s)", pending.len());
                }
                Err(e)
            }
        }
    }

    /// Serializes `pending` into `Set-Cookie` headers on `response`.
    ///
    /// Set records are written first, then remove records. Returns the number of
    /// headers written.
    pub fn write_pending(&self, pending: PendingCookies, response: &mut HeaderMap) -> usize {
        let mut written = 0;

        for record in pending.set {
            let options = self.config.merge(&record.options);
            if self.append(response, &record.name, &record.value, options) {
                written += 1;
            }
        }

        let empty = Value::String(String::new());
        for record in pending.remove {
            let mut options = self.config.merge(&record.options);
            options.max_age = Some(0.0);
            if self.append(response, &record.name, &empty, options) {
                written += 1;
            }
        }

        written
    }

    fn append(&self, response: &mut HeaderMap, name: &str, value: &Value, options: CookieOptions) -> bool {
        let line = match self.codec.serialize(name, value, &options.into()) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Rejected cookie {name:?}: {e}");
                return false;
            }
        };

        match HeaderValue::from_str(&line) {
            Ok(header) => {
                log::debug!("{}: {line}", CookieCodec::HEADER_NAME);
                response.append(SET_COOKIE, header);
                true
            }
            Err(e) => {
                log::error!("Cookie {name:?} does not form a valid header value: {e}");
                false
            }
        }
    }
}
