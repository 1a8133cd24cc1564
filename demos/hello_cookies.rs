use gosub_cookies::cookies::{CookieRemoveRecord, CookieSetRecord, PartialCookieOptions, SameSite};
use gosub_cookies::handler::{with_remove_cookies, with_set_cookies};
use gosub_cookies::{CookieConfig, CookieContext, CookieInterceptor};
use http::header::{COOKIE, SET_COOKIE};
use http::HeaderMap;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Configure the defaults every outgoing cookie is merged over. This is done once, and the
    // config is shared with the interceptor.
    let config = CookieConfig::builder()
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()?;
    let interceptor = CookieInterceptor::new(Arc::new(config));

    // A "route handler" that always refreshes the consent cookie and drops the guest cookie,
    // and sets a per-user cookie on top of that.
    let handler = with_remove_cookies(
        vec![CookieRemoveRecord::new("guest")],
        with_set_cookies(
            vec![CookieSetRecord::new("consent", true).with_options(PartialCookieOptions::new().max_age(86_400_000.0))],
            |ctx: &mut CookieContext, user: String| -> anyhow::Result<String> {
                let visits = ctx.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
                ctx.set_cookie("visits", visits, PartialCookieOptions::new());
                ctx.set_cookie("profile", serde_json::json!({ "user": &user }), PartialCookieOptions::new().secure(true));
                Ok(format!("hello {user}, visit #{visits}"))
            },
        ),
    );

    let mut request = HeaderMap::new();
    request.insert(COOKIE, "visits=41; guest=1".parse()?);
    let mut response = HeaderMap::new();

    let body = interceptor.intercept(&request, &mut response, |ctx| handler(ctx, "gosub".to_string()))?;

    println!("{body}");
    for line in response.get_all(SET_COOKIE) {
        println!("Set-Cookie: {}", line.to_str()?);
    }

    Ok(())
}
