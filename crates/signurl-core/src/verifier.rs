//! Signed URL verification.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. primary signature (`_hash`) -> [`VerificationError::SignatureMismatch`]
//! 2. expiry (`_expires`) -> [`VerificationError::Expired`]
//! 3. single-use binding (`_token`) -> [`VerificationError::AlreadyUsed`] or
//!    [`VerificationError::Failed`]

use std::sync::Arc;

use tracing::debug;

use crate::error::{SignedUrlError, SignedUrlResult, VerificationError};
use crate::expiry::check_expiration;
use crate::request::{RequestContext, SignableRequest};
use crate::signer::Signer;
use crate::single_use::{self, SingleUseToken};

/// Verifies URLs produced by a [`Signer`] with the same secret.
#[derive(Clone)]
pub struct Verifier {
    signer: Arc<Signer>,
    requests: Option<Arc<dyn RequestContext>>,
}

impl Verifier {
    /// Create a verifier without access to a current request.
    #[must_use]
    pub fn new(signer: Arc<Signer>) -> Self {
        Self {
            signer,
            requests: None,
        }
    }

    /// Attach the source of the current request, enabling
    /// [`verify_current_request`](Self::verify_current_request).
    #[must_use]
    pub fn with_request_context(mut self, requests: Arc<dyn RequestContext>) -> Self {
        self.requests = Some(requests);
        self
    }

    /// Verify a URL or request.
    ///
    /// Pass `single_use_token` when the URL is expected to be single-use; it
    /// must be the caller's *current* token value.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`VerificationError`].
    pub fn verify(
        &self,
        request: impl Into<SignableRequest>,
        single_use_token: Option<&SingleUseToken>,
    ) -> Result<(), VerificationError> {
        let request = request.into();
        let now = self.signer.clock().now();

        if !self.signer.check(request.uri()) {
            debug!(url = %request.uri(), "Signed URL signature mismatch");
            return Err(VerificationError::SignatureMismatch {
                url: request.uri().to_owned(),
            });
        }

        check_expiration(&request, now)?;
        single_use::check(&request, single_use_token)?;

        debug!(url = %request.uri(), "Signed URL verification succeeded");
        Ok(())
    }

    /// Like [`verify`](Self::verify) but returns `false` on any verification
    /// failure.
    #[must_use]
    pub fn is_verified(
        &self,
        request: impl Into<SignableRequest>,
        single_use_token: Option<&SingleUseToken>,
    ) -> bool {
        self.verify(request, single_use_token).is_ok()
    }

    /// Verify the request currently being handled.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::NoCurrentRequest`] if no request context is
    /// attached or it has no active request, otherwise
    /// [`SignedUrlError::Verification`] on failure.
    pub fn verify_current_request(
        &self,
        single_use_token: Option<&SingleUseToken>,
    ) -> SignedUrlResult<()> {
        let request = self.current_request()?;
        self.verify(request, single_use_token)?;
        Ok(())
    }

    /// Like [`verify_current_request`](Self::verify_current_request) but maps
    /// verification failures to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::NoCurrentRequest`] if there is no current
    /// request; that is a usage error, not a verification result.
    pub fn is_current_request_verified(
        &self,
        single_use_token: Option<&SingleUseToken>,
    ) -> SignedUrlResult<bool> {
        let request = self.current_request()?;
        Ok(self.is_verified(request, single_use_token))
    }

    fn current_request(&self) -> SignedUrlResult<SignableRequest> {
        self.requests
            .as_ref()
            .and_then(|requests| requests.current_request())
            .ok_or(SignedUrlError::NoCurrentRequest)
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("signer", &self.signer)
            .field("has_request_context", &self.requests.is_some())
            .finish()
    }
}
