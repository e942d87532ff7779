//! The signed URL value object.

use std::fmt;

use chrono::{DateTime, Utc};

/// A signed URL with its expiry and single-use metadata.
///
/// Only produced by [`Builder::create`](crate::Builder::create).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrl {
    url: String,
    expires_at: Option<DateTime<Utc>>,
    single_use: bool,
}

impl SignedUrl {
    pub(crate) fn new(url: String, expires_at: Option<DateTime<Utc>>, single_use: bool) -> Self {
        Self {
            url,
            expires_at,
            single_use,
        }
    }

    /// The URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Consume and return the URL string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.url
    }

    /// When the URL expires, if it is temporary.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the URL has an expiry.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.expires_at.is_some()
    }

    /// Whether the URL is bound to a single-use token.
    #[must_use]
    pub fn is_single_use(&self) -> bool {
        self.single_use
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl From<SignedUrl> for String {
    fn from(url: SignedUrl) -> Self {
        url.url
    }
}
