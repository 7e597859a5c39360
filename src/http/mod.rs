//! In-memory stand-in for the Brello REST API, used for local runs and tests.

pub mod dev_store;
pub mod extract;
pub mod routes;
pub mod routing;
pub mod types;

pub use dev_store::{DevApi, OutboundEmail};
pub use routing::app;
