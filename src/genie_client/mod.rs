pub(crate) mod api;
pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;

pub use client::GenieClient;
pub use models::{Alert, Incident};
