//! Business logic between `stockroom-api` and the front-ends (CLI / TUI).
//!
//! - **[`Catalog`]**: facade owning the API client, the [`Session`], the
//!   in-memory product list, and the [`FavoritesReconciler`]. Cheap to
//!   clone; state is published through `tokio::sync::watch` channels.
//!
//! - **[`FavoritesReconciler`]**: keeps the cached favorites blob, the
//!   in-memory set, and the server's id list consistent. Toggles stand
//!   locally by default and are two-phase under
//!   [`FavoritesPolicy::Confirmed`].
//!
//! - **[`KeyValueStore`]**: injected persistence for the session token and
//!   favorites cache ([`FileStore`] on disk, [`MemoryStore`] for tests).
//!
//! - **[`view`]**: favorites filtering and bounded search suggestions.

pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod request;
pub mod session;
pub mod storage;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::Catalog;
pub use config::{CatalogConfig, DEFAULT_API_URL, FavoritesPolicy, TlsVerification};
pub use error::CoreError;
pub use favorites::FavoritesReconciler;
pub use model::{Favorite, FavoriteSet, FavoriteToggle, Product, ProductId};
pub use request::{
    CreateProductRequest, ImageAttachment, UpdateProductRequest, parse_price, parse_quantity,
    thumbnail_candidates, validate_thumbnail,
};
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use view::{MAX_SUGGESTIONS, ProductListView};
