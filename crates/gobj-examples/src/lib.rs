//! Demo host and leak scenarios for `gobj`.

pub mod host;
pub mod scenarios;
