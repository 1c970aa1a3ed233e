// ── Favorite set ──
//
// Ordered set of favorite products keyed by id. Entries may carry a
// denormalized product snapshot so favorites render before the product
// list has loaded. The server's id list is authoritative; snapshots are
// display data only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::Display;

use super::product::{Product, ProductId};

/// Outcome of a favorites toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

/// One favorited product.
#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
    pub id: ProductId,
    pub snapshot: Option<Product>,
}

impl Favorite {
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            snapshot: Some(product.clone()),
        }
    }

    /// Display name, falling back to the id when no snapshot is held.
    pub fn label(&self) -> &str {
        self.snapshot
            .as_ref()
            .map_or(self.id.as_str(), |p| p.name.as_str())
    }
}

/// On-disk form of a favorite: a product payload, or a bare id.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CachedFavorite {
    Product(Box<Product>),
    Id(ProductId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteSet {
    entries: Vec<Favorite>,
    /// Ids whose membership change has not yet been confirmed by the server.
    pending: BTreeSet<ProductId>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries, dropping empty and repeated ids (first wins).
    pub fn from_entries(entries: impl IntoIterator<Item = Favorite>) -> Self {
        let mut set = Self::new();
        for entry in entries {
            if !entry.id.is_empty() && !set.contains(&entry.id) {
                set.entries.push(entry);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Favorite> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.entries.iter()
    }

    /// Ids in insertion order, as sent to the replace endpoint.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.as_str().to_owned()).collect()
    }

    /// Remove the product if present, otherwise append its snapshot.
    pub fn toggle(&mut self, product: &Product) -> FavoriteToggle {
        if let Some(pos) = self.entries.iter().position(|e| e.id == product.id) {
            self.entries.remove(pos);
            FavoriteToggle::Removed
        } else {
            self.entries.push(Favorite::from_product(product));
            FavoriteToggle::Added
        }
    }

    pub fn is_pending(&self, id: &ProductId) -> bool {
        self.pending.contains(id)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn mark_pending(&mut self, id: ProductId) {
        self.pending.insert(id);
    }

    pub(crate) fn confirm(&mut self, id: &ProductId) {
        self.pending.remove(id);
    }

    /// Serialize for the key-value cache. Entries with a snapshot are
    /// stored as product payloads, the rest as bare ids.
    pub fn to_cache_json(&self) -> Result<String, serde_json::Error> {
        let cached: Vec<CachedFavorite> = self
            .entries
            .iter()
            .map(|e| match &e.snapshot {
                Some(p) => CachedFavorite::Product(Box::new(p.clone())),
                None => CachedFavorite::Id(e.id.clone()),
            })
            .collect();
        serde_json::to_string(&cached)
    }

    pub fn from_cache_json(json: &str) -> Result<Self, serde_json::Error> {
        let cached: Vec<CachedFavorite> = serde_json::from_str(json)?;
        Ok(Self::from_entries(cached.into_iter().map(|c| match c {
            CachedFavorite::Product(p) => Favorite {
                id: p.id.clone(),
                snapshot: Some(*p),
            },
            CachedFavorite::Id(id) => Favorite { id, snapshot: None },
        })))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chair() -> Product {
        Product::new("1", "Chair", "CH1")
    }

    #[test]
    fn double_toggle_restores_original_set() {
        let mut set = FavoriteSet::from_entries([Favorite::from_product(&Product::new(
            "9", "Lamp", "LP1",
        ))]);
        let original = set.clone();

        assert_eq!(set.toggle(&chair()), FavoriteToggle::Added);
        assert!(set.contains(&"1".into()));
        assert_eq!(set.ids(), ["9", "1"]);

        assert_eq!(set.toggle(&chair()), FavoriteToggle::Removed);
        assert_eq!(set, original);
    }

    #[test]
    fn membership_is_by_id_not_payload() {
        let mut set = FavoriteSet::new();
        set.toggle(&chair());
        let mut renamed = chair();
        renamed.name = "Armchair".into();
        assert_eq!(set.toggle(&renamed), FavoriteToggle::Removed);
        assert!(set.is_empty());
    }

    #[test]
    fn cache_round_trip_keeps_order_and_snapshots() {
        let mut set = FavoriteSet::new();
        set.toggle(&chair());
        set.entries.push(Favorite {
            id: "2".into(),
            snapshot: None,
        });

        let json = set.to_cache_json().unwrap();
        let back = FavoriteSet::from_cache_json(&json).unwrap();
        assert_eq!(back.ids(), ["1", "2"]);
        assert_eq!(back.get(&"1".into()).unwrap().label(), "Chair");
        assert_eq!(back.get(&"2".into()).unwrap().label(), "2");
    }

    #[test]
    fn cache_reads_legacy_product_array() {
        let json = r#"[{"_id":"1","name":"Chair","sku":"CH1","price":10},{"_id":"1","name":"dup"}]"#;
        let set = FavoriteSet::from_cache_json(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&"1".into()).unwrap().label(), "Chair");
    }

    #[test]
    fn pending_tracking() {
        let mut set = FavoriteSet::new();
        set.mark_pending("1".into());
        assert!(set.is_pending(&"1".into()));
        assert!(set.has_pending());
        set.confirm(&"1".into());
        assert!(!set.has_pending());
    }
}
