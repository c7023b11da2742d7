//! Fully-read HTTP responses handed to result transforms.

use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::Result;

/// An HTTP response whose body has already been read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    /// Read a reqwest response to completion.
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            url,
            headers,
            body,
        })
    }

    /// Build a response by hand, e.g. to drive a transform in tests.
    pub fn from_parts(
        status: u16,
        url: impl Into<String>,
        headers: HeaderMap,
        body: impl Into<Bytes>,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body: body.into(),
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the status is exactly 200, the only status the
    /// service answers data with.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The final URL after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_bytes(self) -> Bytes {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_from_parts() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/xml; charset=utf-8"));

        let response = RawResponse::from_parts(
            500,
            "http://billing.local/estate",
            headers,
            "<soap:Fault/>",
        );

        assert_eq!(response.status(), 500);
        assert!(!response.is_ok());
        assert_eq!(response.url(), "http://billing.local/estate");
        assert_eq!(response.content_type(), Some("text/xml; charset=utf-8"));
        assert_eq!(response.text(), "<soap:Fault/>");
        assert_eq!(response.into_bytes(), Bytes::from_static(b"<soap:Fault/>"));
    }

    #[test]
    fn test_text_replaces_invalid_utf8() {
        let response =
            RawResponse::from_parts(200, "http://x", HeaderMap::new(), vec![b'o', b'k', 0xff]);
        assert!(response.is_ok());
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
