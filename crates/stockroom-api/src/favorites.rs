// Favorites endpoints
//
// Both calls carry the session's bearer token. The server keeps the
// authoritative id list; `replace_favorites` overwrites it wholesale.

use secrecy::SecretString;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{FavoriteEntry, FavoritesResponse, ReplaceFavorites};

impl ApiClient {
    /// `GET /api/favorites`
    ///
    /// Entries are either full products or bare ids depending on how the
    /// server populates the list.
    pub async fn get_favorites(&self, token: &SecretString) -> Result<Vec<FavoriteEntry>, Error> {
        let url = self.api_url("favorites")?;
        let resp: FavoritesResponse = self.get(url, Some(token)).await?;
        Ok(resp.into_entries())
    }

    /// `POST /api/favorites/update` with `{productIds: [...]}`.
    pub async fn replace_favorites(
        &self,
        token: &SecretString,
        product_ids: &[String],
    ) -> Result<(), Error> {
        let url = self.api_url("favorites/update")?;
        debug!(count = product_ids.len(), "replacing favorites");
        self.post_unit(url, &ReplaceFavorites { product_ids }, Some(token))
            .await
    }
}
