//! Request abstraction for verification.
//!
//! A [`SignableRequest`] is a URL exactly as it was received. It can be built
//! from a raw string or from an inbound [`http`] request, in which case the
//! scheme, host, path and query string are reassembled without touching the
//! order or encoding of the query pairs.

use parking_lot::Mutex;

use crate::canonical::{query_value, raw_query};
use crate::signed_url::SignedUrl;

/// A URL to verify, with typed query accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignableRequest {
    uri: String,
}

impl SignableRequest {
    /// Wrap a raw URL string.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { uri: url.into() }
    }

    /// Rebuild the full URL of an inbound request.
    ///
    /// The scheme comes from the request URI (default `http`), the authority
    /// from the request URI or the `Host` header. Without either the result
    /// is an absolute path.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::from_uri_and_headers(&parts.uri, &parts.headers)
    }

    fn from_uri_and_headers(uri: &http::Uri, headers: &http::HeaderMap) -> Self {
        let path_and_query = uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);

        let authority = uri.authority().map(http::uri::Authority::as_str).or_else(|| {
            headers
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
        });

        let url = match authority {
            Some(authority) => {
                let scheme = uri.scheme_str().unwrap_or("http");
                format!("{scheme}://{authority}{path_and_query}")
            }
            None => path_and_query.to_owned(),
        };

        Self { uri: url }
    }

    /// The full URL.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The raw query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        raw_query(&self.uri)
    }

    /// Decoded value of the query parameter `key`.
    #[must_use]
    pub fn get_string(&self, key: &str) -> Option<String> {
        query_value(&self.uri, key)
    }

    /// Integer value of the query parameter `key`; `None` if absent or not an
    /// integer.
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }
}

impl From<&str> for SignableRequest {
    fn from(url: &str) -> Self {
        Self::from_url(url)
    }
}

impl From<String> for SignableRequest {
    fn from(url: String) -> Self {
        Self::from_url(url)
    }
}

impl From<&String> for SignableRequest {
    fn from(url: &String) -> Self {
        Self::from_url(url.as_str())
    }
}

impl From<&SignedUrl> for SignableRequest {
    fn from(url: &SignedUrl) -> Self {
        Self::from_url(url.as_str())
    }
}

impl From<&http::request::Parts> for SignableRequest {
    fn from(parts: &http::request::Parts) -> Self {
        Self::from_parts(parts)
    }
}

impl<B> From<&http::Request<B>> for SignableRequest {
    fn from(request: &http::Request<B>) -> Self {
        Self::from_uri_and_headers(request.uri(), request.headers())
    }
}

/// Access to the request currently being handled, if any.
///
/// Implementations typically wrap a framework's request-local storage.
pub trait RequestContext: Send + Sync {
    /// The active inbound request.
    fn current_request(&self) -> Option<SignableRequest>;
}

/// A stack of requests; the top of the stack is the current request.
#[derive(Debug, Default)]
pub struct RequestStack {
    requests: Mutex<Vec<SignableRequest>>,
}

impl RequestStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a request, making it current.
    pub fn push(&self, request: impl Into<SignableRequest>) {
        self.requests.lock().push(request.into());
    }

    /// Pop the current request.
    pub fn pop(&self) -> Option<SignableRequest> {
        self.requests.lock().pop()
    }
}

impl RequestContext for RequestStack {
    fn current_request(&self) -> Option<SignableRequest> {
        self.requests.lock().last().cloned()
    }
}
