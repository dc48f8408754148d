//! Core plumbing shared by the shop listing handlers.
//!
//! This crate provides:
//! - `RequestContext` - Request line, mount paths and multi-valued query parameters
//! - `BaseUrl` - Absolute URL construction for listing links
//! - `ShopConfig` - Deployment configuration (TOML or JSON)
//! - `RequestLog` - Structured logging with request context

mod config;
mod context;
mod error;
mod logging;
mod url;

pub use config::*;
pub use context::*;
pub use error::*;
pub use logging::*;
pub use url::*;
