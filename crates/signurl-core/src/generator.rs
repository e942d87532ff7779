//! Entry point for generating signed URLs.

use std::sync::Arc;

use crate::builder::Builder;
use crate::error::SignedUrlResult;
use crate::expiry::Expiry;
use crate::router::Parameters;
use crate::signed_url::SignedUrl;
use crate::signer::Signer;
use crate::single_use::SingleUseToken;

/// Generates standard, temporary and single-use signed URLs.
#[derive(Debug, Clone)]
pub struct UrlGenerator {
    signer: Arc<Signer>,
}

impl UrlGenerator {
    /// Create a generator around a shared signer.
    #[must_use]
    pub fn new(signer: Arc<Signer>) -> Self {
        Self { signer }
    }

    /// The underlying signer.
    #[must_use]
    pub fn signer(&self) -> &Arc<Signer> {
        &self.signer
    }

    /// Generate a standard (non-expiring, reusable) signed absolute URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the route cannot be rendered.
    pub fn generate(&self, route: &str, parameters: Parameters) -> SignedUrlResult<String> {
        self.build(route).parameters(parameters).to_url()
    }

    /// Start a [`Builder`] for `route`.
    #[must_use]
    pub fn build(&self, route: &str) -> Builder<'_> {
        Builder::new(&self.signer, route)
    }

    /// Generate a temporary signed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `expires` cannot be resolved or the route cannot
    /// be rendered.
    pub fn temporary(
        &self,
        route: &str,
        parameters: Parameters,
        expires: impl Into<Expiry>,
    ) -> SignedUrlResult<SignedUrl> {
        self.build(route)
            .parameters(parameters)
            .expires(expires)?
            .create()
    }

    /// Generate a single-use signed URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the route cannot be rendered.
    pub fn single_use(
        &self,
        route: &str,
        parameters: Parameters,
        token: impl Into<SingleUseToken>,
    ) -> SignedUrlResult<SignedUrl> {
        self.build(route)
            .parameters(parameters)
            .single_use(token)
            .create()
    }
}
