//! Router capability used to render routes into URLs.
//!
//! The engine never builds paths itself: it hands a route identifier and its
//! parameters to a [`Router`] and signs whatever comes back. The router owns
//! query-string ordering and escaping. [`PathRouter`] is a small in-memory
//! implementation backed by path templates.

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters percent-encoded when substituting a path placeholder.
///
/// Everything except RFC 3986 unreserved characters is encoded, so a value
/// can never introduce a `/`, `?` or `#`.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The form of URL a router should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceType {
    /// `http://example.com/dir/file`
    #[default]
    AbsoluteUrl,
    /// `/dir/file`
    AbsolutePath,
    /// `//example.com/dir/file`
    NetworkPath,
    /// `dir/file`
    RelativePath,
}

/// Errors produced by a [`Router`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// No route with this name is registered.
    #[error("route not found: {0}")]
    NotFound(String),

    /// The route template has a placeholder without a matching parameter.
    #[error("missing parameter {parameter} for route {route}")]
    MissingParameter {
        /// The route being rendered.
        route: String,
        /// The placeholder name.
        parameter: String,
    },

    /// The base URL is not `scheme://authority`.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// A scalar route parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// String value.
    Str(String),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => f.write_str(if *v { "1" } else { "0" }),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for ParamValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::UInt(u64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Route parameters, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Renders a route identifier and its parameters into a URL.
///
/// Implementations may back this with a framework's route table or any
/// other URL scheme.
pub trait Router: Send + Sync {
    /// Render `route` with `parameters` in the requested form.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the route cannot be rendered.
    fn generate(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RouteError>;
}

/// An in-memory router mapping route names to path templates.
///
/// Templates use `{name}` placeholders. Parameters consumed by placeholders
/// are percent-encoded into the path; the rest become the query string in
/// insertion order.
///
/// # Examples
///
/// ```
/// use signurl_core::router::{Parameters, PathRouter, ReferenceType, Router};
///
/// let router = PathRouter::new("https://example.com")
///     .unwrap()
///     .with_route("confirm", "/confirm/{id}");
///
/// let params = Parameters::new().with("id", 42).with("lang", "en");
/// let url = router.generate("confirm", &params, ReferenceType::AbsoluteUrl).unwrap();
/// assert_eq!(url, "https://example.com/confirm/42?lang=en");
/// ```
#[derive(Debug, Clone)]
pub struct PathRouter {
    scheme: String,
    authority: String,
    routes: HashMap<String, String>,
}

impl PathRouter {
    /// Create a router for `base_url` (`scheme://host[:port]`).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidBaseUrl`] if the base URL has no scheme or
    /// authority.
    pub fn new(base_url: &str) -> Result<Self, RouteError> {
        let uri: http::Uri = base_url
            .parse()
            .map_err(|_| RouteError::InvalidBaseUrl(base_url.to_owned()))?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(RouteError::InvalidBaseUrl(base_url.to_owned()));
        };

        Ok(Self {
            scheme: scheme.to_owned(),
            authority: authority.as_str().to_owned(),
            routes: HashMap::new(),
        })
    }

    /// A router for `http://localhost`.
    #[must_use]
    pub fn localhost() -> Self {
        Self {
            scheme: "http".to_owned(),
            authority: "localhost".to_owned(),
            routes: HashMap::new(),
        }
    }

    /// Register a route.
    pub fn add_route(&mut self, name: impl Into<String>, template: impl Into<String>) {
        let mut template = template.into();
        if !template.starts_with('/') {
            template.insert(0, '/');
        }
        self.routes.insert(name.into(), template);
    }

    /// Builder-style [`add_route`](Self::add_route).
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.add_route(name, template);
        self
    }

    /// Whether a route with this name is registered.
    #[must_use]
    pub fn has_route(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Substitute placeholders, returning the path and the names consumed.
    fn render_path<'a>(
        route: &str,
        template: &'a str,
        parameters: &Parameters,
    ) -> Result<(String, Vec<&'a str>), RouteError> {
        let mut path = String::with_capacity(template.len());
        let mut used = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            let value = parameters
                .get(name)
                .ok_or_else(|| RouteError::MissingParameter {
                    route: route.to_owned(),
                    parameter: name.to_owned(),
                })?;

            path.push_str(&rest[..start]);
            path.extend(utf8_percent_encode(
                &value.to_string(),
                PATH_SEGMENT_ENCODE_SET,
            ));
            used.push(name);
            rest = &rest[start + len + 1..];
        }
        path.push_str(rest);

        Ok((path, used))
    }
}

impl Router for PathRouter {
    fn generate(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
    ) -> Result<String, RouteError> {
        let template = self
            .routes
            .get(route)
            .ok_or_else(|| RouteError::NotFound(route.to_owned()))?;

        let (path, used) = Self::render_path(route, template, parameters)?;

        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in parameters
            .iter()
            .filter(|(k, _)| !used.iter().any(|u| u == k))
        {
            query.append_pair(key, &value.to_string());
        }
        let query = query.finish();

        let mut url = match reference_type {
            ReferenceType::AbsoluteUrl => format!("{}://{}{path}", self.scheme, self.authority),
            ReferenceType::NetworkPath => format!("//{}{path}", self.authority),
            ReferenceType::AbsolutePath => path,
            ReferenceType::RelativePath => path.trim_start_matches('/').to_owned(),
        };
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}
