//! Fluent construction of signed URLs.

use chrono::{DateTime, Utc};

use crate::error::SignedUrlResult;
use crate::expiry::Expiry;
use crate::router::{ParamValue, Parameters, ReferenceType};
use crate::signed_url::SignedUrl;
use crate::signer::Signer;
use crate::single_use::{self, SingleUseToken};

/// Accumulates route parameters, expiry and single-use token, then signs.
///
/// [`create`](Self::create) does not consume the builder and yields the same
/// URL every time it is called with the same state (a lazy token is
/// re-evaluated on each call).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use signurl_core::{PathRouter, Signer, UrlGenerator};
///
/// let router = PathRouter::localhost().with_route("confirm", "/confirm/{id}");
/// let generator = UrlGenerator::new(Arc::new(Signer::new(Arc::new(router), "secret")));
///
/// let url = generator
///     .build("confirm")
///     .param("id", 42)
///     .expires("+1 hour")
///     .unwrap()
///     .single_use("current-password-hash")
///     .create()
///     .unwrap();
///
/// assert!(url.is_temporary());
/// assert!(url.is_single_use());
/// assert!(url.as_str().starts_with("http://localhost/confirm/42?_expires="));
/// ```
#[derive(Debug, Clone)]
pub struct Builder<'a> {
    signer: &'a Signer,
    route: String,
    parameters: Parameters,
    reference_type: ReferenceType,
    expires_at: Option<DateTime<Utc>>,
    single_use_token: Option<SingleUseToken>,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(signer: &'a Signer, route: impl Into<String>) -> Self {
        Self {
            signer,
            route: route.into(),
            parameters: Parameters::new(),
            reference_type: ReferenceType::default(),
            expires_at: None,
            single_use_token: None,
        }
    }

    /// Add one route parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    /// Replace all route parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Select the URL form. Defaults to [`ReferenceType::AbsoluteUrl`].
    #[must_use]
    pub fn reference_type(mut self, reference_type: ReferenceType) -> Self {
        self.reference_type = reference_type;
        self
    }

    /// Make the URL temporary.
    ///
    /// Relative inputs are resolved against the signer's clock right away;
    /// only the resulting timestamp is kept.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::InvalidExpiry`](crate::SignedUrlError::InvalidExpiry)
    /// if `when` cannot be resolved.
    pub fn expires(mut self, when: impl Into<Expiry>) -> SignedUrlResult<Self> {
        let at = when.into().resolve(self.signer.clock().now())?;
        self.expires_at = Some(at);
        Ok(self)
    }

    /// Make the URL temporary with an exact instant (truncated to seconds).
    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = DateTime::from_timestamp(at.timestamp(), 0);
        self
    }

    /// Bind the URL to a single-use token. A token resolving to an empty
    /// string leaves the URL reusable.
    #[must_use]
    pub fn single_use(mut self, token: impl Into<SingleUseToken>) -> Self {
        self.single_use_token = Some(token.into());
        self
    }

    /// Sign and return the [`SignedUrl`].
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Route`](crate::SignedUrlError::Route) if the
    /// route cannot be rendered.
    pub fn create(&self) -> SignedUrlResult<SignedUrl> {
        let token = single_use::resolve_non_empty(self.single_use_token.as_ref())
            .map(SingleUseToken::Literal);
        let url = self.signer.sign(
            &self.route,
            &self.parameters,
            self.reference_type,
            self.expires_at,
            token.as_ref(),
        )?;

        Ok(SignedUrl::new(url, self.expires_at, token.is_some()))
    }

    /// The builder's string form: `create()` followed by taking the URL.
    ///
    /// There is no `Display` impl because signing can fail.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub fn to_url(&self) -> SignedUrlResult<String> {
        self.create().map(SignedUrl::into_string)
    }
}

impl TryFrom<Builder<'_>> for SignedUrl {
    type Error = crate::SignedUrlError;

    fn try_from(builder: Builder<'_>) -> Result<Self, Self::Error> {
        builder.create()
    }
}
