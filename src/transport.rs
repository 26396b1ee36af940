//! HTTP transport seam
//!
//! The client builds requests and decodes responses; the actual network
//! call is delegated to an [`HttpTransport`] implementation supplied by the
//! application. Authentication, retries, progress reporting and
//! cancellation all live behind this trait.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use url::Url;

use crate::error::Result;

/// A fully assembled HTTP request, ready to be performed
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a GET request for the given URL
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a POST request with a body
    pub fn post(url: Url, body: Bytes) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// An HTTP response as raw bytes
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Look up a response header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The response `Content-Type`, if present
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }
}

/// Performs HTTP requests on behalf of the client
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request, returning the complete response body
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        (**self).perform(request).await
    }
}
