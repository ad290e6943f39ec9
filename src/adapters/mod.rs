// Adapters layer: concrete implementations of the domain ports.

pub mod database;
pub mod http;

pub use database::ConnectivityProbe;
pub use http::HttpBackend;
