use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::Error;
use crate::params::Params;

use super::rpc::{RequestParams, RpcEnvelope, RpcRequest, body_preview};

const JSONRPC_VERSION: &str = "2.0";
const CORRELATION_HEADER: &str = "x-correlation-id";

/// Methods the server answers without a session token.
const AUTH_FREE_METHODS: [&str; 2] = ["user.login", "apiinfo.version"];

/// An asynchronous Zabbix API client.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session
/// token and the request id counter, so a clone authenticated via
/// [`login`](Self::login) authenticates its siblings too.
#[derive(Clone, Debug)]
pub struct ZabbixClient {
    http: reqwest::Client,
    endpoint: Url,
    auth: Arc<RwLock<Option<SecretString>>>,
    ids: Arc<AtomicU64>,
}

pub struct ZabbixClientBuilder {
    endpoint: Url,
    auth_token: Option<SecretString>,
    timeout: Duration,
    connect_timeout: Duration,
    insecure_http: bool,
    http: Option<reqwest::Client>,
}

impl ZabbixClientBuilder {
    fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            auth_token: None,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            insecure_http: false,
            http: None,
        }
    }

    /// Seeds the client with an existing session or API token, skipping
    /// the need for [`ZabbixClient::login`].
    #[must_use]
    pub fn auth_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Total per-request timeout. Defaults to 10 seconds.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Connection establishment timeout. Defaults to 5 seconds.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Permits plain-HTTP endpoints. Off by default.
    #[must_use]
    pub const fn insecure_http(mut self, allow: bool) -> Self {
        self.insecure_http = allow;
        self
    }

    /// Replaces the internally built `reqwest::Client`. The supplied
    /// client is used as-is; timeout and header settings on this builder
    /// no longer apply.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the endpoint uses HTTP without
    /// [`insecure_http`](Self::insecure_http), or if the underlying HTTP
    /// client fails to build.
    pub fn build(self) -> Result<ZabbixClient> {
        if self.endpoint.scheme() != "https" && !self.insecure_http {
            return Err(Error::InvalidField {
                field: "endpoint",
                message: "only https URLs are accepted without insecure_http".to_string(),
            });
        }

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/json-rpc"),
                );
                headers.insert(
                    reqwest::header::ACCEPT,
                    HeaderValue::from_static("application/json"),
                );

                let mut builder = reqwest::Client::builder()
                    .default_headers(headers)
                    .connect_timeout(self.connect_timeout)
                    .timeout(self.timeout)
                    .user_agent(concat!("zabbix-api/", env!("CARGO_PKG_VERSION")))
                    .pool_idle_timeout(Duration::from_secs(30));

                if !self.insecure_http {
                    builder = builder.https_only(true);
                }

                builder.build().map_err(|err| Error::Client { source: err })?
            }
        };

        Ok(ZabbixClient {
            http,
            endpoint: self.endpoint,
            auth: Arc::new(RwLock::new(self.auth_token)),
            ids: Arc::new(AtomicU64::new(1)),
        })
    }
}

impl ZabbixClient {
    #[must_use]
    pub fn builder(endpoint: Url) -> ZabbixClientBuilder {
        ZabbixClientBuilder::new(endpoint)
    }

    /// Whether a session token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current_token(&self) -> Option<SecretString> {
        self.auth
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: Option<SecretString>) {
        *self.auth.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    /// Sends one JSON-RPC request and returns the decoded envelope.
    ///
    /// A server-reported `error` member does not fail the call here; the
    /// envelope comes back with it intact. Use
    /// [`call_with_error`](Self::call_with_error) to turn it into an
    /// `Err`. Requests are never retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`] on transport failure,
    /// [`Error::HttpStatus`] on a non-2xx response and [`Error::Json`]
    /// when the body is not a JSON-RPC envelope.
    pub async fn call(
        &self,
        method: &str,
        params: impl Into<RequestParams>,
    ) -> Result<RpcEnvelope> {
        let params = params.into();
        let id = self.next_id();
        let token = if AUTH_FREE_METHODS.contains(&method) {
            None
        } else {
            self.current_token()
        };
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();

        let payload = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params: &params,
            id,
            auth: token.as_ref().map(ExposeSecret::expose_secret),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CORRELATION_HEADER, &correlation_id)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus { status });
        }

        let body = response.bytes().await?;
        let envelope: RpcEnvelope = serde_json::from_slice(&body).map_err(|err| {
            let mut message = format!("error decoding response body: {err}; body preview: ");
            let _ = FmtWrite::write_str(&mut message, &body_preview(&body));
            Error::Json { message }
        })?;

        if envelope.id != Value::from(id) {
            warn!(
                method,
                %correlation_id,
                sent = id,
                received = %envelope.id,
                "response id does not match request id"
            );
        }

        debug!(
            method,
            %correlation_id,
            id,
            latency_ms = started.elapsed().as_millis(),
            "zabbix call completed"
        );

        Ok(envelope)
    }

    /// Like [`call`](Self::call), but a server-reported error object
    /// becomes [`Error::Api`] carrying the verbatim code, message and
    /// data.
    ///
    /// # Errors
    ///
    /// Everything [`call`](Self::call) returns, plus [`Error::Api`].
    pub async fn call_with_error(
        &self,
        method: &str,
        params: impl Into<RequestParams>,
    ) -> Result<RpcEnvelope> {
        let envelope = self.call(method, params).await?;
        if let Some(err) = envelope.error {
            return Err(Error::Api {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        Ok(envelope)
    }

    /// Runs [`call_with_error`](Self::call_with_error) and decodes the
    /// `result` member into `T`.
    ///
    /// # Errors
    ///
    /// Everything [`call_with_error`](Self::call_with_error) returns,
    /// plus [`Error::MissingField`] when the response carries no
    /// `result` and [`Error::Json`] when `result` does not match `T`.
    pub async fn call_with_error_parse<T>(
        &self,
        method: &str,
        params: impl Into<RequestParams>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let envelope = self.call_with_error(method, params).await?;
        let result = envelope
            .result
            .ok_or(Error::MissingField { field: "result" })?;
        serde_json::from_value(result).map_err(|err| Error::Json {
            message: format!("error decoding {method} result: {err}"),
        })
    }

    /// Calls `user.login` and stores the returned session token for
    /// subsequent requests on this client and its clones.
    ///
    /// # Errors
    ///
    /// Call failures as in
    /// [`call_with_error_parse`](Self::call_with_error_parse); an empty
    /// token from the server is reported as [`Error::InvalidField`].
    pub async fn login(&self, username: &str, password: &str) -> Result<SecretString> {
        #[derive(Serialize)]
        struct LoginParams<'a> {
            username: &'a str,
            password: &'a str,
        }

        let params = RequestParams::from_serialize(&LoginParams { username, password })?;
        let token: String = self.call_with_error_parse("user.login", params).await?;
        if token.is_empty() {
            return Err(Error::InvalidField {
                field: "auth",
                message: "user.login returned an empty session token".to_string(),
            });
        }

        let secret = SecretString::from(token);
        self.set_token(Some(secret.clone()));
        Ok(secret)
    }

    /// Calls `apiinfo.version`. The method is answered without
    /// authentication.
    ///
    /// # Errors
    ///
    /// See [`call_with_error_parse`](Self::call_with_error_parse).
    pub async fn version(&self) -> Result<String> {
        self.call_with_error_parse("apiinfo.version", Params::new())
            .await
    }
}
