//! HTTP request building and per-call transport options.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Head => reqwest::Method::HEAD,
        }
    }
}

/// Transport options merged into a single call.
///
/// `verify` defaults to `true` when unset. Setting `proxy`, or turning
/// `verify` off, makes the call go through a dedicated HTTP client built for
/// that request instead of the pooled one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Per-request timeout, overriding the client default.
    pub timeout: Option<Duration>,
    /// Proxy URL for all schemes.
    pub proxy: Option<String>,
    /// Verify TLS certificates.
    pub verify: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Returns true if a header with this name is set (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// Set a header only if the caller has not already set one with this name.
    pub fn set_default_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.has_header(&name) {
            self.headers.insert(name, value.into());
        }
    }

    /// Whether the call needs its own HTTP client (proxy or relaxed TLS).
    pub(crate) fn needs_dedicated_client(&self) -> bool {
        self.proxy.is_some() || self.verify == Some(false)
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
    Form(Vec<(String, String)>),
}

/// Builder for HTTP requests.
///
/// The target URL may be absolute (`http...`) or a path relative to the
/// client's base URL; it is resolved when the request is executed.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: RequestMethod,
    pub(crate) url: String,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) options: RequestOptions,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query_params: Vec::new(),
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Add several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Merge transport options into this request.
    ///
    /// Headers in `options` replace existing headers of the same name
    /// (case-insensitive); other headers, including a body's default
    /// `Content-Type`, are kept. `timeout`, `proxy` and `verify` override the
    /// current values when set.
    pub fn options(mut self, options: RequestOptions) -> Self {
        for (name, value) in options.headers {
            self.options
                .headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            self.options.headers.insert(name, value);
        }
        if options.timeout.is_some() {
            self.options.timeout = options.timeout;
        }
        if options.proxy.is_some() {
            self.options.proxy = options.proxy;
        }
        if options.verify.is_some() {
            self.options.verify = options.verify;
        }
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        self.body = Some(RequestBody::Json(value));
        self.options
            .set_default_header("Content-Type", "application/json");
        Ok(self)
    }

    /// Set text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.options.set_default_header("Content-Type", "text/plain");
        self
    }

    /// Set XML body (for SOAP). Keeps a caller-supplied Content-Type.
    pub fn xml(mut self, data: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(data.into()));
        self.options
            .set_default_header("Content-Type", "text/xml; charset=utf-8");
        self
    }

    /// Set bytes body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Set form body.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(RequestBody::Form(fields));
        self.options
            .set_default_header("Content-Type", "application/x-www-form-urlencoded");
        self
    }

    /// The method this request will use.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The target as given, before resolution against the base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The transport options for this request.
    pub fn transport_options(&self) -> &RequestOptions {
        &self.options
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}
