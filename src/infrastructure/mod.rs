pub mod auth_client;
pub mod http_store;

pub use auth_client::AuthClient;
pub use http_store::HttpRemoteStore;
