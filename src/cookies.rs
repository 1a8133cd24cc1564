// src/cookies.rs
//! Cookies: [`CookieCodec`], options and the set/remove records handlers queue.

mod codec;
mod options;
mod records;

pub use codec::is_field_content;
pub use codec::utc_string;
pub use codec::CookieCodec;
pub use codec::CookieMap;

pub use options::default_decode;
pub use options::default_encode;
pub use options::CookieOptions;
pub use options::Decoder;
pub use options::Encoder;
pub use options::PartialCookieOptions;
pub use options::SameSite;

pub use records::CookieRemoveRecord;
pub use records::CookieSetRecord;
