//! The typed HTTP client: request plumbing and the identity endpoint.

use std::sync::Arc;

use lectern_auth::{AuthError, IdentityProvider};
use lectern_model::{MeResponse, User};
use lectern_store::Store;
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ApiError;

/// A typed client for the dashboard backend.
///
/// Credentials are attached per request: the bearer token is read from
/// the shared store on every call (so a token that appears or vanishes
/// between calls is picked up immediately), and the httpOnly session
/// cookie rides along in the reqwest cookie jar, opaque to us.
///
/// Cloning is cheap — the underlying `reqwest::Client` is an `Arc`
/// internally, and so is the store handle.
pub struct ApiClient<S> {
    base: Url,
    http: reqwest::Client,
    store: Arc<S>,
}

impl<S> Clone for ApiClient<S> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            http: self.http.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> ApiClient<S> {
    /// Creates a client for the backend at `base_url`.
    ///
    /// The store is shared with the auth controller: both sides must
    /// resolve tokens from the same keys.
    pub fn new(base_url: &str, store: Arc<S>) -> Result<Self, ApiError> {
        let base =
            Url::parse(base_url).map_err(|e| ApiError::Url(e.to_string()))?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self { base, http, store })
    }

    /// The backend base URL this client was built with.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // -- Request plumbing --------------------------------------------------

    /// Resolves `path` against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Url(e.to_string()))
    }

    /// Sends a request and decodes the JSON response body.
    ///
    /// The bearer token, when one is stored, is attached as an
    /// `Authorization` header. Non-2xx responses become
    /// [`ApiError::Status`] with the body kept verbatim.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, ApiError> {
        let bytes = self.request_raw(method, url, body).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Sends a request, checks the status, and returns the raw body.
    pub(crate) async fn request_raw(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<Vec<u8>, ApiError> {
        tracing::trace!(%method, %url, "backend request");

        let mut request = self.http.request(method, url);
        if let Some(token) = lectern_store::current_token(self.store.as_ref())
        {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend error response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// `GET path`, decoding the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.request_json(Method::GET, url, None::<&()>).await
    }

    /// `POST path` with a JSON body, decoding the JSON response.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.request_json(Method::POST, url, Some(body)).await
    }

    /// `PUT path` with a JSON body, decoding the JSON response.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        self.request_json(Method::PUT, url, Some(body)).await
    }

    /// `DELETE path`, ignoring any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        self.request_raw(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    // -- Identity ----------------------------------------------------------

    /// Calls the identity endpoint and maps its loose payload onto a
    /// [`User`].
    pub async fn me(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.get("/api/auth/me").await?;
        Ok(me.into_user())
    }
}

/// The production identity strategy: ask the backend who the stored
/// credential belongs to.
///
/// Credential clearing on failure is deliberately NOT done here — the
/// auth controller owns that decision; this impl only classifies what
/// the backend said.
impl<S: Store> IdentityProvider for ApiClient<S> {
    fn fetch_identity(
        &self,
    ) -> impl std::future::Future<Output = Result<User, AuthError>> + Send
    {
        async move {
            match self.me().await {
                Ok(user) => Ok(user),
                Err(e) if e.is_auth_rejection() => {
                    Err(AuthError::CredentialRejected(e.to_string()))
                }
                Err(e) => Err(AuthError::Unreachable(e.to_string())),
            }
        }
    }
}
