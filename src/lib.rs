pub mod config;
pub mod context;
pub mod cookies;
pub mod errors;
pub mod handler;
pub mod interceptor;

pub use config::CookieConfig;
pub use context::{CookieContext, PendingCookies};
pub use errors::CookieError;
pub use interceptor::CookieInterceptor;
