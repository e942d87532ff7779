//! Single-use binding.
//!
//! A single-use URL carries a second signature, `_token`, computed with a
//! caller-supplied token as the HMAC key instead of the primary secret. The
//! engine stores nothing: the caller keeps the token (e.g. a password hash or
//! a "last login" timestamp) and changes it once the URL has been used, which
//! makes the `_token` signature stop matching.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::canonical::{
    SIGNATURE_KEY, SINGLE_USE_TOKEN_KEY, append_query_param, compute_signature, signatures_match,
    strip_query_params,
};
use crate::error::VerificationError;
use crate::request::SignableRequest;

/// A single-use token: either a literal value or a supplier evaluated each
/// time the token is needed.
#[derive(Clone)]
pub enum SingleUseToken {
    /// A literal token value.
    Literal(String),
    /// A lazily evaluated token value.
    Lazy(Arc<dyn Fn() -> String + Send + Sync>),
}

impl SingleUseToken {
    /// Create a token from a supplier. The supplier runs on every sign or
    /// verify call; its result is never cached.
    pub fn lazy(supplier: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Lazy(Arc::new(supplier))
    }

    /// Produce the current token value.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Literal(token) => token.clone(),
            Self::Lazy(supplier) => supplier(),
        }
    }
}

impl fmt::Debug for SingleUseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => f.write_str("SingleUseToken::Literal(..)"),
            Self::Lazy(_) => f.write_str("SingleUseToken::Lazy(..)"),
        }
    }
}

impl From<&str> for SingleUseToken {
    fn from(token: &str) -> Self {
        Self::Literal(token.to_owned())
    }
}

impl From<String> for SingleUseToken {
    fn from(token: String) -> Self {
        Self::Literal(token)
    }
}

impl From<&String> for SingleUseToken {
    fn from(token: &String) -> Self {
        Self::Literal(token.clone())
    }
}

/// Resolve `token`, treating an empty value as no token at all.
pub(crate) fn resolve_non_empty(token: Option<&SingleUseToken>) -> Option<String> {
    token.map(SingleUseToken::resolve).filter(|value| !value.is_empty())
}

/// Append the `_token` signature of `url` keyed by `token`.
pub(crate) fn bind(url: &str, token: &str) -> String {
    let message = strip_query_params(url, &[SIGNATURE_KEY, SINGLE_USE_TOKEN_KEY]);
    let signature = compute_signature(token.as_bytes(), &message);
    append_query_param(url, SINGLE_USE_TOKEN_KEY, &signature)
}

/// Check the `_token` signature against the caller's current token.
///
/// | URL has `_token` | token given | outcome |
/// |---|---|---|
/// | no | no | ok |
/// | yes | yes | compare, mismatch is [`VerificationError::AlreadyUsed`] |
/// | yes | no | [`VerificationError::Failed`] |
/// | no | yes | [`VerificationError::Failed`] |
///
/// A token that resolves to an empty string counts as "not given".
pub(crate) fn check(
    request: &SignableRequest,
    token: Option<&SingleUseToken>,
) -> Result<(), VerificationError> {
    let provided = request
        .get_string(SINGLE_USE_TOKEN_KEY)
        .filter(|value| !value.is_empty());

    match (provided, resolve_non_empty(token)) {
        (None, None) => Ok(()),
        (Some(_), None) => Err(VerificationError::Failed {
            url: request.uri().to_owned(),
            reason: "Given URL is single use but this was not expected.".to_owned(),
        }),
        (None, Some(_)) => Err(VerificationError::Failed {
            url: request.uri().to_owned(),
            reason: "Expected single use URL.".to_owned(),
        }),
        (Some(provided), Some(token)) => {
            let message =
                strip_query_params(request.uri(), &[SIGNATURE_KEY, SINGLE_USE_TOKEN_KEY]);
            let expected = compute_signature(token.as_bytes(), &message);

            if signatures_match(&provided, &expected) {
                Ok(())
            } else {
                debug!("Single-use signature does not match the current token");
                Err(VerificationError::AlreadyUsed {
                    url: request.uri().to_owned(),
                })
            }
        }
    }
}
