//! Handler wrappers.
//!
//! Route handlers that always set (or remove) the same cookies can be wrapped instead
//! of calling [`CookieContext::set_cookie`] themselves. The wrapper stages the static
//! records on the context and then calls through to the handler, which may still add
//! dynamic records of its own.
//!
//! ```rust
//! use gosub_cookies::CookieContext;
//! use gosub_cookies::cookies::{CookieRemoveRecord, CookieSetRecord, PartialCookieOptions};
//! use gosub_cookies::handler::{with_remove_cookies, with_set_cookies};
//!
//! let login = with_set_cookies(
//!     vec![CookieSetRecord::new("seen_login", true)],
//!     |ctx: &mut CookieContext, user: String| {
//!         ctx.set_cookie("user", user.as_str(), PartialCookieOptions::new().http_only(true));
//!         format!("welcome {user}")
//!     },
//! );
//! let login = with_remove_cookies(vec![CookieRemoveRecord::new("guest")], login);
//!
//! let mut ctx = CookieContext::default();
//! assert_eq!(login(&mut ctx, "ann".to_string()), "welcome ann");
//! assert_eq!(ctx.pending().set.len(), 2);
//! assert_eq!(ctx.pending().remove.len(), 1);
//! ```

use crate::context::CookieContext;
use crate::cookies::{CookieRemoveRecord, CookieSetRecord};

/// Wraps `handler` so `records` are queued for setting before it runs.
pub fn with_set_cookies<Req, R, F>(records: Vec<CookieSetRecord>, handler: F) -> impl Fn(&mut CookieContext, Req) -> R
where
    F: Fn(&mut CookieContext, Req) -> R,
{
    move |ctx: &mut CookieContext, req: Req| {
        ctx.stage_set(records.clone());
        handler(ctx, req)
    }
}

/// Wraps `handler` so `records` are queued for removal before it runs.
pub fn with_remove_cookies<Req, R, F>(records: Vec<CookieRemoveRecord>, handler: F) -> impl Fn(&mut CookieContext, Req) -> R
where
    F: Fn(&mut CookieContext, Req) -> R,
{
    move |ctx: &mut CookieContext, req: Req| {
        ctx.stage_remove(records.clone());
        handler(ctx, req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::PartialCookieOptions;
    use serde_json::json;

    #[test]
    fn static_records_are_staged_before_the_handler_runs() {
        let handler = with_set_cookies(vec![CookieSetRecord::new("a", "1")], |ctx: &mut CookieContext, _: ()| {
            // handler sees the staged record already
            ctx.pending().set.len()
        });

        let mut ctx = CookieContext::default();
        assert_eq!(handler(&mut ctx, ()), 1);
    }

    #[test]
    fn dynamic_records_are_appended() {
        let handler = with_set_cookies(vec![CookieSetRecord::new("static", "s")], |ctx: &mut CookieContext, v: i32| {
            ctx.set_cookie("dynamic", v, PartialCookieOptions::new());
        });

        let mut ctx = CookieContext::default();
        handler(&mut ctx, 7);

        let pending = ctx.take_pending();
        assert_eq!(pending.set[0].name, "static");
        assert_eq!(pending.set[1].name, "dynamic");
        assert_eq!(pending.set[1].value, json!(7));
    }

    #[test]
    fn wrapper_is_reusable_across_requests() {
        let handler = with_remove_cookies(vec![CookieRemoveRecord::new("gone")], |_: &mut CookieContext, _: ()| {});

        for _ in 0..3 {
            let mut ctx = CookieContext::default();
            handler(&mut ctx, ());
            assert_eq!(ctx.take_pending().remove.len(), 1);
        }
    }

    #[test]
    fn wrappers_compose() {
        let handler = with_remove_cookies(
            vec![CookieRemoveRecord::new("r")],
            with_set_cookies(vec![CookieSetRecord::new("s", "v")], |_: &mut CookieContext, _: ()| "ok"),
        );

        let mut ctx = CookieContext::default();
        assert_eq!(handler(&mut ctx, ()), "ok");
        assert_eq!(ctx.pending().set.len(), 1);
        assert_eq!(ctx.pending().remove.len(), 1);
    }
}
