// ── Product list presentation ──
//
// Pure functions over the in-memory product list and favorite set, plus
// a small state holder for the filter toggle and the search term. Nothing
// here touches the network or the store.

use crate::model::{FavoriteSet, Product, ProductId};

/// Most suggestions shown for a search term.
pub const MAX_SUGGESTIONS: usize = 5;

/// Products to display: all of them, or only favorites, in list order.
pub fn filter_products<'a>(
    products: &'a [Product],
    favorites: &FavoriteSet,
    favorites_only: bool,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| !favorites_only || favorites.contains(&p.id))
        .collect()
}

/// Lazily yield up to [`MAX_SUGGESTIONS`] products whose name or SKU
/// contains `term`, ignoring case. An empty term yields nothing; any
/// other term, whitespace included, is matched as typed.
pub fn search<'a>(
    products: &'a [Product],
    term: &str,
) -> impl Iterator<Item = &'a Product> + use<'a> {
    let needle = term.to_lowercase();
    let limit = if needle.is_empty() { 0 } else { MAX_SUGGESTIONS };
    products
        .iter()
        .filter(move |p| p.matches_lowercase(&needle))
        .take(limit)
}

/// Filter mode and search term for a product list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListView {
    favorites_only: bool,
    term: String,
}

impl ProductListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter_mode(&mut self, favorites_only: bool) {
        self.favorites_only = favorites_only;
    }

    pub fn favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn clear_term(&mut self) {
        self.term.clear();
    }

    /// Whether the suggestion panel should be shown at all.
    pub fn shows_suggestions(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn visible<'a>(&self, products: &'a [Product], favorites: &FavoriteSet) -> Vec<&'a Product> {
        filter_products(products, favorites, self.favorites_only)
    }

    /// Suggestions for the current term. Searches the whole list, not just
    /// what the filter shows.
    pub fn suggestions<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        search(products, &self.term).collect()
    }

    /// Pick the suggestion at `index`, clearing the term. Returns the id
    /// to open in the detail view.
    pub fn select_suggestion(&mut self, products: &[Product], index: usize) -> Option<ProductId> {
        let id = search(products, &self.term).nth(index).map(|p| p.id.clone())?;
        self.clear_term();
        Some(id)
    }
}
