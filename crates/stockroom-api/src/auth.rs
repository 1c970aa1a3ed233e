// Token authentication
//
// Login and registration both exchange credentials for an opaque bearer
// token. There is no logout endpoint; ending a session is client-side.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::AuthResponse;

impl ApiClient {
    /// `POST /api/auth/login` with `{email, password}`.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.api_url("auth/login")?;
        debug!("logging in as {}", email);

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp: AuthResponse = self.post(url, &body, None).await.map_err(reject_as_auth)?;
        Ok(SecretString::from(resp.token))
    }

    /// `POST /api/auth/register` with `{name, email, password}`.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let url = self.api_url("auth/register")?;
        debug!("registering {}", email);

        let body = json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        });

        let resp: AuthResponse = self.post(url, &body, None).await.map_err(reject_as_auth)?;
        Ok(SecretString::from(resp.token))
    }
}

/// Credential endpoints answer bad input with 400/401/403; surface all of
/// those as authentication failures carrying the server's message.
fn reject_as_auth(err: Error) -> Error {
    match err {
        Error::Api {
            status: 400 | 403,
            message,
        } => Error::Authentication { message },
        other => other,
    }
}
