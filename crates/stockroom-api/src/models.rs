// Wire types for the catalog REST API.
//
// Field names follow the server's JSON (`_id`, `createdAt`, ...). Anything
// optional on the wire defaults so partially populated records still decode.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ── Products ────────────────────────────────────────────────────────

/// A product record as returned by `/api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiProduct {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "updatedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A local file to attach to a create/update request as an `images` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type guessed from the file extension.
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// Multipart payload for `POST /api/products` and `PUT /api/products/:id`.
///
/// `thumbnail` is only sent on update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductForm {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: u32,
    pub thumbnail: Option<String>,
    pub images: Vec<ImageUpload>,
}

// ── Auth ────────────────────────────────────────────────────────────

/// `{ "token": "..." }` returned by login and register.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

/// The `{ "message": "..." }` body the server uses for errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

// ── Favorites ───────────────────────────────────────────────────────

/// One element of a favorites list: either a full product or a bare id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FavoriteEntry {
    Product(Box<ApiProduct>),
    Id(String),
}

impl FavoriteEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Product(p) => &p.id,
            Self::Id(id) => id,
        }
    }

    pub fn into_product(self) -> Option<ApiProduct> {
        match self {
            Self::Product(p) => Some(*p),
            Self::Id(_) => None,
        }
    }
}

/// Shapes the server has used for `GET /api/favorites`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FavoritesResponse {
    List(Vec<FavoriteEntry>),
    ProductIds {
        #[serde(rename = "productIds")]
        product_ids: Vec<FavoriteEntry>,
    },
    Favorites {
        favorites: Vec<FavoriteEntry>,
    },
}

impl FavoritesResponse {
    pub(crate) fn into_entries(self) -> Vec<FavoriteEntry> {
        match self {
            Self::List(entries)
            | Self::ProductIds {
                product_ids: entries,
            }
            | Self::Favorites { favorites: entries } => entries,
        }
    }
}

/// Body of `POST /api/favorites/update`.
#[derive(Debug, Serialize)]
pub(crate) struct ReplaceFavorites<'a> {
    #[serde(rename = "productIds")]
    pub product_ids: &'a [String],
}
