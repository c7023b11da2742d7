//! Core HTTP client with base URL resolution and ZKHB response handling.

use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{RequestBody, RequestBuilder, RequestMethod, RequestOptions};
use crate::response::RawResponse;

/// HTTP client for the ZKHB service.
///
/// Holds the base URL that relative request paths resolve against and a
/// pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ZkhbHttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    base_url: String,
}

impl ZkhbHttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let inner = client_builder(&config)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(base_url, ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the base URL. A single trailing slash is stripped.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = normalize_base_url(base_url.into());
    }

    /// Resolve a request target against the base URL.
    ///
    /// Targets starting with `http` are used as they are. Anything else is a
    /// path: a leading `/` is added when missing and the base URL prefixed.
    pub fn resolve_url(&self, url: &str) -> Result<url::Url> {
        let resolved = if url.starts_with("http") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        };

        url::Url::parse(&resolved).map_err(|e| {
            Error::with_source(ErrorKind::InvalidUrl(format!("{resolved}: {e}")), e)
        })
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Get, url)
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(RequestMethod::Post, url)
    }

    /// Create a request builder for any method.
    pub fn request(&self, method: RequestMethod, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Execute a request and return the body text of a 200 response.
    ///
    /// Any other status yields `Ok(None)`; only transport failures are errors.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Option<String>> {
        let response = self.send_raw(request).await?;

        if response.is_ok() {
            Ok(Some(response.text()))
        } else {
            if self.config.enable_tracing {
                info!(status = response.status(), "Non-200 response, no data returned");
            }
            Ok(None)
        }
    }

    /// Execute a request and hand the raw response to `transform`.
    ///
    /// The transform sees every response regardless of status.
    pub async fn execute_with<T, F>(&self, request: RequestBuilder, transform: F) -> Result<T>
    where
        F: FnOnce(RawResponse) -> T,
    {
        let response = self.send_raw(request).await?;
        Ok(transform(response))
    }

    /// Send a request and read the whole response.
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn send_raw(&self, request: RequestBuilder) -> Result<RawResponse> {
        let mut url = self.resolve_url(&request.url)?;
        if !request.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query_params);
        }

        let client = if request.options.needs_dedicated_client() {
            self.dedicated_client(&request.options)?
        } else {
            self.inner.clone()
        };

        let mut req = client.request(request.method.to_reqwest(), url.clone());

        for (name, value) in &request.options.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = request.options.timeout {
            req = req.timeout(timeout);
        }

        if let Some(body) = request.body {
            req = match body {
                RequestBody::Json(value) => req.json(&value),
                RequestBody::Text(text) => req.body(text),
                RequestBody::Bytes(bytes) => req.body(bytes),
                RequestBody::Form(fields) => req.body(
                    url::form_urlencoded::Serializer::new(String::new())
                        .extend_pairs(&fields)
                        .finish(),
                ),
            };
        }

        if self.config.enable_tracing {
            debug!(method = ?request.method, url = %url, "Sending request");
        }

        let response = RawResponse::read(req.send().await?).await?;

        if self.config.enable_tracing {
            let status = response.status();
            let content_length = response.bytes().len();
            if response.is_ok() {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        Ok(response)
    }

    /// Build a one-off client honouring the proxy/TLS options of a call.
    fn dedicated_client(&self, options: &RequestOptions) -> Result<reqwest::Client> {
        let mut builder = client_builder(&self.config);

        if let Some(ref proxy) = options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        if options.verify == Some(false) {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
    }
}

fn client_builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .gzip(config.accept_compressed)
        .deflate(config.accept_compressed)
}

fn normalize_base_url(base_url: String) -> String {
    match base_url.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => base_url,
    }
}
