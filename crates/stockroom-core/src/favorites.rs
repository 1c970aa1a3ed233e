// ── Favorites reconciler ──
//
// Keeps the cached favorites blob, the in-memory snapshot, and the
// server's id list in step. Every toggle rewrites the whole blob and
// replaces the whole server list; nothing is merged incrementally.

use std::sync::Arc;

use stockroom_api::ApiClient;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::FavoritesPolicy;
use crate::error::CoreError;
use crate::model::{Favorite, FavoriteSet, FavoriteToggle, Product, ProductId};
use crate::session::Session;
use crate::storage::{FAVORITES_KEY, KeyValueStore};

/// Owns the favorite set for one user session.
pub struct FavoritesReconciler {
    api: ApiClient,
    session: Session,
    store: Arc<dyn KeyValueStore>,
    policy: FavoritesPolicy,
    timeout_secs: u64,
    state: watch::Sender<Arc<FavoriteSet>>,
    /// Serializes read-modify-write cycles on the cached blob.
    write_lock: Mutex<()>,
}

impl FavoritesReconciler {
    pub fn new(
        api: ApiClient,
        session: Session,
        store: Arc<dyn KeyValueStore>,
        policy: FavoritesPolicy,
    ) -> Self {
        let (state, _) = watch::channel(Arc::new(FavoriteSet::new()));
        Self {
            api,
            session,
            store,
            policy,
            timeout_secs: 0,
            state,
            write_lock: Mutex::new(()),
        }
    }

    /// Timeout reported in `CoreError::Timeout` when a request times out.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn policy(&self) -> FavoritesPolicy {
        self.policy
    }

    /// Current in-memory favorite set.
    pub fn snapshot(&self) -> Arc<FavoriteSet> {
        self.state.borrow().clone()
    }

    /// Receive every published favorite set.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FavoriteSet>> {
        self.state.subscribe()
    }

    /// Publish the cached set without a network round trip.
    pub fn load_cached(&self) -> Arc<FavoriteSet> {
        let set = decode_cache(self.store.as_ref());
        debug!(count = set.len(), "loaded cached favorites");
        self.publish(set)
    }

    /// Add the product to favorites, or remove it if already present.
    ///
    /// Under [`FavoritesPolicy::Confirmed`] the change is published as
    /// pending and undone if the server rejects it. Under
    /// [`FavoritesPolicy::Optimistic`] the local change stands either way.
    /// A server failure is returned in both cases.
    pub async fn toggle(&self, product: &Product) -> Result<FavoriteToggle, CoreError> {
        if product.id.is_empty() {
            return Err(CoreError::validation("product has no id"));
        }
        let token = self.session.require()?;

        let _guard = self.write_lock.lock().await;

        let previous = self.read_cache().await;
        let mut next = previous.clone();
        let outcome = next.toggle(product);
        if self.policy == FavoritesPolicy::Confirmed {
            next.mark_pending(product.id.clone());
        }

        self.write_cache(&next).await?;
        self.publish(next.clone());
        debug!(id = %product.id, %outcome, policy = %self.policy, "favorite toggled locally");

        let remote = self.api.replace_favorites(&token, &next.ids()).await;
        next.confirm(&product.id);

        match remote {
            Ok(()) => {
                self.publish(next);
                info!(id = %product.id, %outcome, "favorite synced");
                Ok(outcome)
            }
            Err(e) => {
                let err = CoreError::from(e).with_timeout(self.timeout_secs);
                match self.policy {
                    FavoritesPolicy::Confirmed => {
                        warn!(id = %product.id, error = %err, "favorites update rejected, rolling back");
                        if let Err(cache_err) = self.write_cache(&previous).await {
                            warn!(error = %cache_err, "could not restore favorites cache");
                        }
                        self.publish(previous);
                    }
                    FavoritesPolicy::Optimistic => {
                        warn!(id = %product.id, error = %err, "favorites update failed, keeping local change");
                        self.publish(next);
                    }
                }
                Err(err)
            }
        }
    }

    /// Replace the cached set with the server's list.
    ///
    /// The server decides membership. Each id keeps the freshest snapshot
    /// on hand: the server's payload, then `products`, then the previous
    /// cache entry. Favorites of products deleted on the server drop out.
    ///
    /// Holds the write lock across the fetch, so a toggle either lands
    /// before the list is read or waits for the sync to finish.
    pub async fn sync_from_server(
        &self,
        products: &[Product],
    ) -> Result<Arc<FavoriteSet>, CoreError> {
        let token = self.session.require()?;

        let _guard = self.write_lock.lock().await;
        let entries = self
            .api
            .get_favorites(&token)
            .await
            .map_err(|e| CoreError::from(e).with_timeout(self.timeout_secs))?;
        let previous = self.read_cache().await;

        let merged = FavoriteSet::from_entries(entries.into_iter().map(|entry| {
            let id = ProductId::new(entry.id());
            let snapshot = entry
                .into_product()
                .map(Product::from)
                .or_else(|| products.iter().find(|p| p.id == id).cloned())
                .or_else(|| previous.get(&id).and_then(|f| f.snapshot.clone()));
            Favorite { id, snapshot }
        }));

        let dropped = previous.iter().filter(|f| !merged.contains(&f.id)).count();
        info!(
            count = merged.len(),
            dropped, "favorites synced from server"
        );

        self.write_cache(&merged).await?;
        Ok(self.publish(merged))
    }

    // ── Cache helpers ────────────────────────────────────────────────

    // Store access is blocking file I/O, so it runs on the blocking pool.

    async fn read_cache(&self) -> FavoriteSet {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || decode_cache(store.as_ref()))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "favorites cache read task failed, starting empty");
                FavoriteSet::new()
            })
    }

    async fn write_cache(&self, set: &FavoriteSet) -> Result<(), CoreError> {
        let json = set
            .to_cache_json()
            .map_err(|e| CoreError::Internal(format!("cannot encode favorites: {e}")))?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.set(FAVORITES_KEY, &json))
            .await
            .map_err(|e| CoreError::Internal(format!("favorites cache write task failed: {e}")))??;
        Ok(())
    }

    fn publish(&self, set: FavoriteSet) -> Arc<FavoriteSet> {
        let set = Arc::new(set);
        self.state.send_replace(Arc::clone(&set));
        set
    }
}

/// Read the cached blob. A missing or unreadable blob is an empty set.
fn decode_cache(store: &dyn KeyValueStore) -> FavoriteSet {
    let raw = match store.get(FAVORITES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return FavoriteSet::new(),
        Err(e) => {
            warn!(error = %e, "favorites cache unreadable, starting empty");
            return FavoriteSet::new();
        }
    };
    FavoriteSet::from_cache_json(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "favorites cache corrupt, starting empty");
        FavoriteSet::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chair() -> Product {
        Product::new("1", "Chair", "CH1")
    }

    fn table() -> Product {
        Product::new("2", "Table", "TB1")
    }

    async fn setup(
        policy: FavoritesPolicy,
        logged_in: bool,
    ) -> (MockServer, Arc<MemoryStore>, FavoritesReconciler) {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let session = Session::load(store.clone()).unwrap();
        if logged_in {
            session
                .set_token(SecretString::from("tok".to_string()))
                .unwrap();
        }
        let api = ApiClient::with_defaults(server.uri().parse().unwrap()).unwrap();
        let reconciler = FavoritesReconciler::new(api, session, store.clone(), policy);
        (server, store, reconciler)
    }

    async fn accept_updates(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/favorites/update"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(server)
            .await;
    }

    async fn reject_updates(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/favorites/update"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })),
            )
            .mount(server)
            .await;
    }

    fn cached_ids(store: &MemoryStore) -> Vec<String> {
        let raw = store.get(FAVORITES_KEY).unwrap().unwrap_or_else(|| "[]".into());
        FavoriteSet::from_cache_json(&raw).unwrap().ids()
    }

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        accept_updates(&server).await;

        assert_eq!(rec.toggle(&chair()).await.unwrap(), FavoriteToggle::Added);
        assert_eq!(rec.snapshot().ids(), ["1"]);
        assert!(!rec.snapshot().has_pending());
        assert_eq!(cached_ids(&store), ["1"]);

        assert_eq!(rec.toggle(&chair()).await.unwrap(), FavoriteToggle::Removed);
        assert!(rec.snapshot().is_empty());
        assert!(cached_ids(&store).is_empty());
    }

    #[tokio::test]
    async fn toggle_submits_full_id_list() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        store
            .set(FAVORITES_KEY, &json!([{ "_id": "2", "name": "Table" }]).to_string())
            .unwrap();

        Mock::given(method("POST"))
            .and(path("/api/favorites/update"))
            .and(body_json(json!({ "productIds": ["2", "1"] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        rec.toggle(&chair()).await.unwrap();
        assert_eq!(cached_ids(&store), ["2", "1"]);
    }

    #[tokio::test]
    async fn confirmed_policy_rolls_back_on_failure() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        reject_updates(&server).await;

        let err = rec.toggle(&chair()).await.unwrap_err();
        assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
        assert!(rec.snapshot().is_empty());
        assert!(!rec.snapshot().has_pending());
        assert!(cached_ids(&store).is_empty());
    }

    #[tokio::test]
    async fn optimistic_policy_keeps_change_on_failure() {
        let (server, store, rec) = setup(FavoritesPolicy::Optimistic, true).await;
        reject_updates(&server).await;

        let err = rec.toggle(&chair()).await.unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
        assert_eq!(rec.snapshot().ids(), ["1"]);
        assert_eq!(cached_ids(&store), ["1"]);
    }

    #[tokio::test]
    async fn toggle_without_session_touches_nothing() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, false).await;

        let err = rec.toggle(&chair()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotAuthenticated));
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), None);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_rejects_empty_id() {
        let (_server, _store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        let err = rec.toggle(&Product::new("", "Ghost", "GH")).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn corrupt_cache_loads_empty() {
        let (_server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        store.set(FAVORITES_KEY, "{{{").unwrap();
        assert!(rec.load_cached().is_empty());
    }

    #[tokio::test]
    async fn load_cached_publishes_to_subscribers() {
        let (_server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        store
            .set(FAVORITES_KEY, &json!([{ "_id": "1", "name": "Chair" }]).to_string())
            .unwrap();
        let mut rx = rec.subscribe();

        rec.load_cached();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().ids(), ["1"]);
    }

    #[tokio::test]
    async fn sync_prefers_server_and_prunes_deleted() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        // Cache holds "1" and a product deleted on the server ("3").
        store
            .set(
                FAVORITES_KEY,
                &json!([
                    { "_id": "1", "name": "Old chair" },
                    { "_id": "3", "name": "Gone" }
                ])
                .to_string(),
            )
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "productIds": ["1", "2", { "_id": "4", "name": "Desk", "sku": "DK1" }]
            })))
            .mount(&server)
            .await;

        let synced = rec.sync_from_server(&[chair(), table()]).await.unwrap();

        assert_eq!(synced.ids(), ["1", "2", "4"]);
        assert_eq!(synced.get(&"1".into()).unwrap().label(), "Chair");
        assert_eq!(synced.get(&"2".into()).unwrap().label(), "Table");
        assert_eq!(synced.get(&"4".into()).unwrap().label(), "Desk");
        assert_eq!(cached_ids(&store), ["1", "2", "4"]);
    }

    #[tokio::test]
    async fn sync_falls_back_to_cached_snapshot() {
        let (server, store, rec) = setup(FavoritesPolicy::Confirmed, true).await;
        store
            .set(FAVORITES_KEY, &json!([{ "_id": "7", "name": "Stool" }]).to_string())
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["7"])))
            .mount(&server)
            .await;

        let synced = rec.sync_from_server(&[]).await.unwrap();
        assert_eq!(synced.get(&"7".into()).unwrap().label(), "Stool");
    }

    #[tokio::test]
    async fn toggle_during_sync_is_not_overwritten() {
        let (server, store, rec) = setup(FavoritesPolicy::Optimistic, true).await;
        accept_updates(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/favorites"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let products = [chair()];
        let toggled_product = chair();
        let (synced, toggled) = tokio::join!(rec.sync_from_server(&products), rec.toggle(&toggled_product));

        assert!(synced.unwrap().is_empty());
        assert_eq!(toggled.unwrap(), FavoriteToggle::Added);
        assert_eq!(rec.snapshot().ids(), ["1"]);
        assert_eq!(cached_ids(&store), ["1"]);
    }

    #[tokio::test]
    async fn toggle_persists_through_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let server = MockServer::start().await;
        accept_updates(&server).await;

        let store: Arc<dyn KeyValueStore> = Arc::new(crate::storage::FileStore::new(&path));
        let session = Session::load(Arc::clone(&store)).unwrap();
        session
            .set_token(SecretString::from("tok".to_string()))
            .unwrap();
        let api = ApiClient::with_defaults(server.uri().parse().unwrap()).unwrap();
        let rec = FavoritesReconciler::new(api, session, Arc::clone(&store), FavoritesPolicy::default());

        rec.toggle(&chair()).await.unwrap();

        let reopened = crate::storage::FileStore::new(&path);
        let raw = reopened.get(FAVORITES_KEY).unwrap().unwrap();
        assert_eq!(FavoriteSet::from_cache_json(&raw).unwrap().ids(), ["1"]);
    }
}
