// stockroom-api: Async Rust client for the stockroom product catalog REST API

pub mod auth;
pub mod client;
pub mod error;
pub mod favorites;
pub mod models;
pub mod products;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{ApiProduct, FavoriteEntry, ImageUpload, ProductForm};
pub use transport::{TlsMode, TransportConfig};
