#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod genie_client;
pub mod metrics;
pub mod paging;
pub mod request;
pub mod server;
pub mod telemetry;
pub mod types;
pub mod util;

pub type Result<T> = std::result::Result<T, error::Error>;
