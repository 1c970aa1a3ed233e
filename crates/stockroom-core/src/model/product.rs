use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque product identifier (the API's `_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A catalog product.
///
/// Serialized with the server's field names so cached snapshots keep the
/// same shape as API payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
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

impl Product {
    /// Minimal product, mostly for tests and placeholders.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: name.into(),
            description: String::new(),
            price: Decimal::ZERO,
            quantity: 0,
            thumbnail: None,
            images: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Price formatted for display (`$12.50`).
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }

    /// Image shown in lists and on the detail view: the thumbnail if set,
    /// otherwise the first image.
    pub fn cover_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// Case-insensitive substring match on name or SKU. `needle` must
    /// already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.sku.to_lowercase().contains(needle)
    }
}

impl From<stockroom_api::ApiProduct> for Product {
    fn from(p: stockroom_api::ApiProduct) -> Self {
        Self {
            id: ProductId(p.id),
            sku: p.sku,
            name: p.name,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
            thumbnail: p.thumbnail.filter(|t| !t.is_empty()),
            images: p.images,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_price_has_two_decimals() {
        let mut p = Product::new("1", "Chair", "CH1");
        p.price = Decimal::new(495, 1);
        assert_eq!(p.display_price(), "$49.50");
        p.price = Decimal::from(3);
        assert_eq!(p.display_price(), "$3.00");
    }

    #[test]
    fn cover_image_prefers_thumbnail() {
        let mut p = Product::new("1", "Chair", "CH1");
        assert_eq!(p.cover_image(), None);
        p.images = vec!["a.png".into(), "b.png".into()];
        assert_eq!(p.cover_image(), Some("a.png"));
        p.thumbnail = Some("b.png".into());
        assert_eq!(p.cover_image(), Some("b.png"));
    }

    #[test]
    fn serializes_with_wire_id() {
        let p = Product::new("42", "Lamp", "LP1");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["_id"], "42");
        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn empty_thumbnail_from_api_is_none() {
        let api: stockroom_api::ApiProduct = serde_json::from_value(serde_json::json!({
            "_id": "1", "thumbnail": ""
        }))
        .unwrap();
        assert!(Product::from(api).thumbnail.is_none());
    }
}
