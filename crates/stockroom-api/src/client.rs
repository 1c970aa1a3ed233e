// Catalog API HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/` and uniform
// response handling. Endpoint groups (auth, products, favorites) are
// implemented as inherent methods in their own modules.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Longest slice of a response body carried into error messages.
const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the catalog REST API.
///
/// Stateless with respect to authentication: endpoints that need a bearer
/// token take it as an argument, so the session lives with the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:5000`); paths
    /// are appended below `/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with the default transport settings.
    pub fn with_defaults(base_url: Url) -> Result<Self, Error> {
        Self::new(base_url, &TransportConfig::default())
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// Build `{base}/api/{collection}/{id}` with the id percent-encoded.
    pub(crate) fn item_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        let mut url = self.api_url(collection)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn authorize(
        builder: reqwest::RequestBuilder,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = Self::authorize(self.http.get(url), token)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = Self::authorize(self.http.post(url).json(body), token)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a POST request with a JSON body, ignoring the response body.
    pub(crate) async fn post_unit(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
        token: Option<&SecretString>,
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = Self::authorize(self.http.post(url).json(body), token)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::check_status(resp).await.map(drop)
    }

    /// Send a multipart form with the given method and decode the response.
    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("{} {} (multipart)", method, url);

        let resp = self
            .http
            .request(method, url)
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a DELETE request, ignoring the response body.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self.http.delete(url).send().await.map_err(Error::Transport)?;

        Self::check_status(resp).await.map(drop)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map non-success statuses into `Error`, passing successful
    /// responses through untouched.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let preview = preview(&body);
                if preview.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {preview}")
                }
            });

        trace!(status = status.as_u16(), %message, "request failed");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication { message });
        }

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_joins_under_api_prefix() {
        let c = client("http://localhost:5000/");
        assert_eq!(
            c.api_url("products").unwrap().as_str(),
            "http://localhost:5000/api/products"
        );
        assert_eq!(
            c.api_url("/favorites/update").unwrap().as_str(),
            "http://localhost:5000/api/favorites/update"
        );
    }

    #[test]
    fn api_url_keeps_base_path() {
        let c = client("https://shop.example.com/admin");
        assert_eq!(
            c.api_url("auth/login").unwrap().as_str(),
            "https://shop.example.com/admin/api/auth/login"
        );
    }

    #[test]
    fn item_url_encodes_id() {
        let c = client("http://localhost:5000");
        assert_eq!(
            c.item_url("products", "a b/c").unwrap().as_str(),
            "http://localhost:5000/api/products/a%20b%2Fc"
        );
    }
}
