//! Error types for signed URL generation and verification.
//!
//! Verification failures are represented by [`VerificationError`]. Each variant
//! carries the offending URL and exposes a [`message_key`](VerificationError::message_key)
//! that never changes between releases, so it can be used as a translation key.
//! Everything else that can go wrong (no ambient request, unparseable expiry,
//! router failures, bad configuration) is a [`SignedUrlError`].

use chrono::{DateTime, Utc};

use crate::router::RouteError;

/// Message key shared by generic verification failures.
const VERIFICATION_FAILED_KEY: &str = "URL Verification failed.";

/// The kind of a [`VerificationError`], for callers that branch without
/// inspecting the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationErrorKind {
    /// The primary signature did not verify.
    SignatureMismatch,
    /// The signature verified but the URL is past its expiry.
    Expired,
    /// The single-use signature does not match the current token.
    AlreadyUsed,
    /// Any other structural verification problem.
    Failed,
}

/// Reasons a signed URL failed verification, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The `_hash` parameter is missing or does not match the URL.
    #[error("URL signature mismatch.")]
    SignatureMismatch {
        /// The URL that failed verification.
        url: String,
    },

    /// The signature is valid but the current time is past `_expires`.
    #[error("URL has expired.")]
    Expired {
        /// The URL that failed verification.
        url: String,
        /// The instant the URL stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// The URL is single-use and its token no longer matches.
    #[error("URL has already been used.")]
    AlreadyUsed {
        /// The URL that failed verification.
        url: String,
    },

    /// Generic failure, e.g. the URL and the caller disagree on whether the
    /// URL is single-use.
    #[error("{reason}")]
    Failed {
        /// The URL that failed verification.
        url: String,
        /// Human readable reason.
        reason: String,
    },
}

impl VerificationError {
    /// The URL that failed verification.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::SignatureMismatch { url }
            | Self::Expired { url, .. }
            | Self::AlreadyUsed { url }
            | Self::Failed { url, .. } => url,
        }
    }

    /// The expiry instant, only present for [`VerificationError::Expired`].
    #[must_use]
    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Expired { expired_at, .. } => Some(*expired_at),
            _ => None,
        }
    }

    /// The kind of failure.
    #[must_use]
    pub fn kind(&self) -> VerificationErrorKind {
        match self {
            Self::SignatureMismatch { .. } => VerificationErrorKind::SignatureMismatch,
            Self::Expired { .. } => VerificationErrorKind::Expired,
            Self::AlreadyUsed { .. } => VerificationErrorKind::AlreadyUsed,
            Self::Failed { .. } => VerificationErrorKind::Failed,
        }
    }

    /// User-safe reason. The value for a given kind must never change so it
    /// can be used for translations.
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::SignatureMismatch { .. } | Self::Failed { .. } => VERIFICATION_FAILED_KEY,
            Self::Expired { .. } => "URL has expired.",
            Self::AlreadyUsed { .. } => "URL has already been used.",
        }
    }
}

/// Crate-level error type.
#[derive(Debug, thiserror::Error)]
pub enum SignedUrlError {
    /// The URL failed verification.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// "Verify current request" was called without an active request.
    #[error("Current request not available.")]
    NoCurrentRequest,

    /// The expiry value could not be resolved to an absolute instant.
    #[error("{input} is not a valid expiration")]
    InvalidExpiry {
        /// The rejected input, as given.
        input: String,
    },

    /// The router could not render the route.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SignedUrlError {
    /// The verification failure, if this error is one.
    #[must_use]
    pub fn as_verification(&self) -> Option<&VerificationError> {
        match self {
            Self::Verification(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience result type for signed URL operations.
pub type SignedUrlResult<T> = Result<T, SignedUrlError>;
