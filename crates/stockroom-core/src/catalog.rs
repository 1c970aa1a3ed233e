// ── Catalog facade ──
//
// Single entry point for the front-ends: session handling, product CRUD
// against the in-memory list, and favorites through the reconciler.
// State is published through `watch` channels so the TUI can re-render
// on change and the CLI can read snapshots.

use std::sync::Arc;

use stockroom_api::ApiClient;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::error::CoreError;
use crate::favorites::FavoritesReconciler;
use crate::model::{FavoriteSet, FavoriteToggle, Product, ProductId};
use crate::request::{CreateProductRequest, UpdateProductRequest};
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::view;

/// Cheaply cloneable handle over one catalog API and one local store.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    config: CatalogConfig,
    api: ApiClient,
    session: Session,
    products: watch::Sender<Arc<Vec<Product>>>,
    favorites: FavoritesReconciler,
}

impl Catalog {
    /// Build a catalog from configuration. Does no network I/O.
    pub fn new(config: CatalogConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.api_url.clone(), &config.transport())?;
        Self::with_api(config, api, store)
    }

    /// Build a catalog around an existing API client.
    pub fn with_api(
        config: CatalogConfig,
        api: ApiClient,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let session = Session::load(Arc::clone(&store))?;
        let favorites =
            FavoritesReconciler::new(api.clone(), session.clone(), store, config.favorites_policy)
                .with_timeout_secs(config.timeout.as_secs());
        let (products, _) = watch::channel(Arc::new(Vec::new()));

        Ok(Self {
            inner: Arc::new(CatalogInner {
                config,
                api,
                session,
                products,
                favorites,
            }),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn favorites_reconciler(&self) -> &FavoritesReconciler {
        &self.inner.favorites
    }

    fn api_err(&self, err: stockroom_api::Error) -> CoreError {
        CoreError::from(err).with_timeout(self.inner.config.timeout.as_secs())
    }

    fn require_session(&self) -> Result<(), CoreError> {
        self.inner.session.require().map(drop)
    }

    // ── Authentication ───────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    pub async fn login(&self, email: &str, password: &secrecy::SecretString) -> Result<(), CoreError> {
        let token = self
            .inner
            .api
            .login(email, password)
            .await
            .map_err(|e| self.api_err(e))?;
        self.inner.session.set_token(token)?;
        info!(email, "logged in");
        Ok(())
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &secrecy::SecretString,
    ) -> Result<(), CoreError> {
        let token = self
            .inner
            .api
            .register(name, email, password)
            .await
            .map_err(|e| self.api_err(e))?;
        self.inner.session.set_token(token)?;
        info!(email, "registered");
        Ok(())
    }

    /// Client-side logout: forget the token.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.session.clear()
    }

    // ── Products ─────────────────────────────────────────────────────

    /// Current in-memory product list.
    pub fn products(&self) -> Arc<Vec<Product>> {
        self.inner.products.borrow().clone()
    }

    pub fn subscribe_products(&self) -> watch::Receiver<Arc<Vec<Product>>> {
        self.inner.products.subscribe()
    }

    /// Look up a product in the in-memory list.
    pub fn cached_product(&self, id: &ProductId) -> Option<Product> {
        self.inner.products.borrow().iter().find(|p| &p.id == id).cloned()
    }

    /// Fetch the product list and replace the in-memory copy.
    pub async fn refresh_products(&self) -> Result<Arc<Vec<Product>>, CoreError> {
        self.require_session()?;
        let products: Vec<Product> = self
            .inner
            .api
            .list_products()
            .await
            .map_err(|e| self.api_err(e))?
            .into_iter()
            .map(Product::from)
            .collect();
        debug!(count = products.len(), "products refreshed");
        let products = Arc::new(products);
        self.inner.products.send_replace(Arc::clone(&products));
        Ok(products)
    }

    /// Fetch one product from the API.
    pub async fn product(&self, id: &ProductId) -> Result<Product, CoreError> {
        self.require_session()?;
        self.inner
            .api
            .get_product(id.as_str())
            .await
            .map(Product::from)
            .map_err(|e| self.api_err(e).for_product(id.as_str()))
    }

    /// Create a product and append it to the in-memory list.
    pub async fn create_product(&self, req: &CreateProductRequest) -> Result<Product, CoreError> {
        self.require_session()?;
        req.validate()?;
        let created = Product::from(
            self.inner
                .api
                .create_product(&req.to_form())
                .await
                .map_err(|e| self.api_err(e))?,
        );
        info!(id = %created.id, sku = %created.sku, "product created");
        self.inner.products.send_modify(|list| {
            Arc::make_mut(list).push(created.clone());
        });
        Ok(created)
    }

    /// Update a product and replace its entry in the in-memory list.
    ///
    /// The thumbnail choice is checked against the product's current images
    /// plus the new attachments.
    pub async fn update_product(
        &self,
        id: &ProductId,
        req: &UpdateProductRequest,
    ) -> Result<Product, CoreError> {
        self.require_session()?;
        let current = match self.cached_product(id) {
            Some(p) => p,
            None => self.product(id).await?,
        };
        req.validate(&current)?;

        let updated = Product::from(
            self.inner
                .api
                .update_product(id.as_str(), &req.to_form(&current))
                .await
                .map_err(|e| self.api_err(e).for_product(id.as_str()))?,
        );
        info!(id = %updated.id, "product updated");
        self.inner.products.send_modify(|list| {
            let list = Arc::make_mut(list);
            match list.iter_mut().find(|p| p.id == updated.id) {
                Some(slot) => *slot = updated.clone(),
                None => list.push(updated.clone()),
            }
        });
        Ok(updated)
    }

    /// Delete a product and drop it from the in-memory list. Favorites are
    /// left alone; `sync_favorites` prunes them against the server.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), CoreError> {
        self.require_session()?;
        self.inner
            .api
            .delete_product(id.as_str())
            .await
            .map_err(|e| self.api_err(e).for_product(id.as_str()))?;
        info!(%id, "product deleted");
        self.inner.products.send_modify(|list| {
            Arc::make_mut(list).retain(|p| &p.id != id);
        });
        Ok(())
    }

    // ── Favorites ────────────────────────────────────────────────────

    pub fn favorites(&self) -> Arc<FavoriteSet> {
        self.inner.favorites.snapshot()
    }

    pub fn subscribe_favorites(&self) -> watch::Receiver<Arc<FavoriteSet>> {
        self.inner.favorites.subscribe()
    }

    pub fn load_cached_favorites(&self) -> Arc<FavoriteSet> {
        self.inner.favorites.load_cached()
    }

    pub async fn toggle_favorite(&self, product: &Product) -> Result<FavoriteToggle, CoreError> {
        self.inner.favorites.toggle(product).await
    }

    /// Adopt the server's favorites list, using the current product list
    /// for snapshots.
    pub async fn sync_favorites(&self) -> Result<Arc<FavoriteSet>, CoreError> {
        let products = self.products();
        self.inner.favorites.sync_from_server(&products).await
    }

    // ── Presentation ─────────────────────────────────────────────────

    /// Products to display for the given filter mode.
    pub fn visible_products(&self, favorites_only: bool) -> Vec<Product> {
        let products = self.products();
        let favorites = self.favorites();
        view::filter_products(&products, &favorites, favorites_only)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Search suggestions over the full in-memory list.
    pub fn search(&self, term: &str) -> Vec<Product> {
        let products = self.products();
        view::search(&products, term).cloned().collect()
    }
}
