//! HTTP client for the TourCraft backend.

use std::sync::{Arc, RwLock};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    auth::AuthApi,
    config::{ClientSettings, TimeoutClass, TimeoutClasses},
    error::{Error, Result},
    guides::GuidesApi,
    token::{MemoryTokenStore, TokenStore},
    tours::ToursApi,
    types::ResolvedGuides,
};

/// Callback invoked when the server invalidates the session (HTTP 401).
///
/// The hosting application decides what to do with it — a browser shell
/// navigates to the login view, a CLI prints a prompt. The client itself
/// only clears the token store.
pub type SessionInvalidatedHook = Arc<dyn Fn() + Send + Sync>;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallOptions {
    /// Attach the stored bearer token. If no token is stored the header is
    /// simply omitted; the server is the authority on rejecting the call.
    pub require_auth: bool,
    /// Timeout SLA for the call.
    pub timeout: TimeoutClass,
}

impl CallOptions {
    /// Options for an authenticated call with the default timeout.
    #[must_use]
    pub fn authed() -> Self {
        Self {
            require_auth: true,
            timeout: TimeoutClass::Default,
        }
    }

    /// Use a different timeout class.
    #[must_use]
    pub fn with_timeout(mut self, timeout: TimeoutClass) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the API.
///
/// # Example
///
/// ```rust,no_run
/// use tourcraft_sdk::{Client, ClientSettings};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::new(ClientSettings::new("http://localhost:8000"))?;
///
/// // Guides API
/// let guides = client.guides().list().await?;
///
/// // Auth API
/// let status = client.auth().check_auth_status().await;
/// println!("authenticated: {}", status.is_authenticated());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    timeouts: TimeoutClasses,
    tokens: Arc<dyn TokenStore>,
    on_session_invalidated: Option<SessionInvalidatedHook>,
    // One resolved guide set per tour per session, see GuidesApi::resolve_for_tour.
    guide_cache: Arc<RwLock<Option<(String, ResolvedGuides)>>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl Client {
    /// Create a client with an in-memory token store.
    pub fn new(settings: ClientSettings) -> Result<Self> {
        Self::builder(settings).build()
    }

    /// Start building a client with a custom token store or session hook.
    #[must_use]
    pub fn builder(settings: ClientSettings) -> ClientBuilder {
        ClientBuilder {
            settings,
            tokens: None,
            on_session_invalidated: None,
            http: None,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token store this client reads bearer tokens from.
    #[must_use]
    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the Auth API.
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    /// Access the Tour Generation API.
    #[must_use]
    pub fn tours(&self) -> ToursApi<'_> {
        ToursApi { client: self }
    }

    /// Access the Guides API.
    #[must_use]
    pub fn guides(&self) -> GuidesApi<'_> {
        GuidesApi { client: self }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP verbs
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a GET request.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, opts: CallOptions) -> Result<T> {
        self.execute(Method::GET, endpoint, None, opts).await
    }

    /// Issue a POST request with a JSON body.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
        opts: CallOptions,
    ) -> Result<T> {
        self.execute(Method::POST, endpoint, Some(serde_json::to_value(body)?), opts)
            .await
    }

    /// Issue a POST request without a body.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        opts: CallOptions,
    ) -> Result<T> {
        self.execute(Method::POST, endpoint, None, opts).await
    }

    /// Issue a PUT request with a JSON body.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
        opts: CallOptions,
    ) -> Result<T> {
        self.execute(Method::PUT, endpoint, Some(serde_json::to_value(body)?), opts)
            .await
    }

    /// Issue a DELETE request.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        opts: CallOptions,
    ) -> Result<T> {
        self.execute(Method::DELETE, endpoint, None, opts).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn guide_cache(&self) -> &RwLock<Option<(String, ResolvedGuides)>> {
        &self.guide_cache
    }

    /// Drop the memoized guide set, forcing the next resolution to hit the
    /// network again.
    pub fn clear_guide_cache(&self) {
        if let Ok(mut cache) = self.guide_cache.write() {
            *cache = None;
        }
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        // The base URL is normalized to end with '/' at build time, so
        // joining a relative endpoint preserves any path prefix on it.
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<serde_json::Value>,
        opts: CallOptions,
    ) -> Result<T> {
        let url = self.url(endpoint)?;
        let duration = self.timeouts.duration(opts.timeout);

        // Snapshot before the request so a token written while the call is
        // in flight survives a 401-triggered clear.
        let snapshot = self.tokens.snapshot();

        let mut rb = self.http.request(method.clone(), url);
        if opts.require_auth {
            if let Some(token) = &snapshot.token {
                rb = rb.bearer_auth(token);
            }
        }
        if let Some(body) = &body {
            rb = rb.json(body);
        }

        tracing::debug!(
            method = %method,
            endpoint = endpoint,
            require_auth = opts.require_auth,
            timeout_secs = duration.as_secs(),
            "Sending API request"
        );

        let send = async {
            let response = rb.send().await?;
            let status = response.status();
            let is_json = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("json"));
            let bytes = response.bytes().await?;
            Ok::<_, Error>((status, is_json, bytes))
        };

        let (status, is_json, bytes) = match tokio::time::timeout(duration, send).await {
            Ok(result) => result.map_err(|err| {
                tracing::warn!(endpoint = endpoint, error = %err, "Request transport failure");
                err
            })?,
            Err(_) => {
                tracing::warn!(
                    endpoint = endpoint,
                    timeout_secs = duration.as_secs(),
                    "Request aborted after timeout"
                );
                return Err(Error::Network {
                    detail: format!("request timed out after {}s", duration.as_secs()),
                });
            }
        };

        if status.as_u16() == 401 {
            // Unconditional session-invalidated side effect, whatever the
            // endpoint. The clear is generation-guarded; the hook fires
            // exactly once per 401 response.
            let cleared = self.tokens.clear_if_current(snapshot.generation);
            tracing::warn!(
                endpoint = endpoint,
                token_cleared = cleared,
                "Session invalidated by server"
            );
            if let Some(hook) = &self.on_session_invalidated {
                hook();
            }
            return Err(Error::SessionExpired {
                message: decode_error_message(&bytes, status.as_u16()),
            });
        }

        if !status.is_success() {
            let message = decode_error_message(&bytes, status.as_u16());
            tracing::warn!(endpoint = endpoint, status = status.as_u16(), message = %message, "API error response");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        decode_success(&bytes, is_json)
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    settings: ClientSettings,
    tokens: Option<Arc<dyn TokenStore>>,
    on_session_invalidated: Option<SessionInvalidatedHook>,
    http: Option<reqwest::Client>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ClientBuilder {
    /// Use a specific token store instead of the in-memory default.
    #[must_use]
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Register a callback for server-side session invalidation (401).
    #[must_use]
    pub fn on_session_invalidated(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_invalidated = Some(Arc::new(hook));
        self
    }

    /// Use a custom reqwest client.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        let mut base = self.settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        Ok(Client {
            base_url,
            http: self.http.unwrap_or_default(),
            timeouts: self.settings.timeouts,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            on_session_invalidated: self.on_session_invalidated,
            guide_cache: Arc::new(RwLock::new(None)),
        })
    }
}

fn decode_error_message(bytes: &[u8], status: u16) -> String {
    // Error bodies are JSON objects with a message under one of a few
    // conventional keys; anything else gets a synthetic message carrying
    // the HTTP status.
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(bytes) {
        for key in ["detail", "message", "error"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    format!("HTTP error {status}")
}

fn decode_success<T: DeserializeOwned>(bytes: &[u8], is_json: bool) -> Result<T> {
    if bytes.is_empty() {
        // Empty bodies (204 and friends) decode as null (e.g. `()`).
        Ok(serde_json::from_value(serde_json::Value::Null)?)
    } else if is_json {
        Ok(serde_json::from_slice(bytes)?)
    } else {
        // Non-JSON responses surface as raw text.
        let text = String::from_utf8_lossy(bytes).into_owned();
        Ok(serde_json::from_value(serde_json::Value::String(text))?)
    }
}
