// ── Domain model ──

pub mod favorite;
pub mod product;

pub use favorite::{Favorite, FavoriteSet, FavoriteToggle};
pub use product::{Product, ProductId};
