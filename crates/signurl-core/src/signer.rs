//! Canonicalization and signing.
//!
//! [`Signer::sign`] renders a route through the [`Router`], optionally
//! injects `_expires`, optionally binds a single-use token as `_token`, and
//! finally appends `_hash`, the HMAC-SHA256 of everything before it keyed by
//! the primary secret.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::canonical::{
    EXPIRES_AT_KEY, RESERVED_KEYS, SIGNATURE_KEY, append_query_param, compute_signature,
    query_value, signatures_match, strip_query_params,
};
use crate::error::SignedUrlResult;
use crate::expiry::{Clock, SystemClock};
use crate::router::{Parameters, ReferenceType, Router};
use crate::single_use::{self, SingleUseToken};

/// Signs URLs with a primary secret.
///
/// A signer is immutable and can be shared freely between threads.
#[derive(Clone)]
pub struct Signer {
    secret: Vec<u8>,
    router: Arc<dyn Router>,
    clock: Arc<dyn Clock>,
}

impl Signer {
    /// Create a signer using `router` to render routes and `secret` as the
    /// primary HMAC key. The system clock is used.
    pub fn new(router: Arc<dyn Router>, secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            router,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock, e.g. with a [`FixedClock`](crate::FixedClock).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The clock used for expiry resolution and checks.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Sign `route` rendered with `parameters`.
    ///
    /// `expires_at` is written as `_expires` before rendering. When
    /// `single_use_token` is given, the rendered URL is bound to it as
    /// `_token`; a token resolving to an empty string is ignored. `_hash` is
    /// always computed last.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Route`](crate::SignedUrlError::Route) if the
    /// router cannot render the route.
    pub fn sign(
        &self,
        route: &str,
        parameters: &Parameters,
        reference_type: ReferenceType,
        expires_at: Option<DateTime<Utc>>,
        single_use_token: Option<&SingleUseToken>,
    ) -> SignedUrlResult<String> {
        if let Some((key, _)) = parameters
            .iter()
            .find(|(key, _)| RESERVED_KEYS.contains(key))
        {
            warn!(route, key, "Route parameter uses a reserved query key");
        }

        let url = match expires_at {
            Some(at) => {
                let mut parameters = parameters.clone();
                parameters.insert(EXPIRES_AT_KEY, at.timestamp());
                self.router.generate(route, &parameters, reference_type)?
            }
            None => self.router.generate(route, parameters, reference_type)?,
        };

        let token = single_use::resolve_non_empty(single_use_token);
        let url = match &token {
            Some(token) => single_use::bind(&url, token),
            None => url,
        };

        let hash = compute_signature(&self.secret, &strip_query_params(&url, &[SIGNATURE_KEY]));
        let signed = append_query_param(&url, SIGNATURE_KEY, &hash);

        debug!(
            route,
            expires_at = expires_at.map(|at| at.timestamp()),
            single_use = token.is_some(),
            "Signed URL"
        );

        Ok(signed)
    }

    /// Whether the `_hash` of `url` matches the rest of the URL.
    #[must_use]
    pub fn check(&self, url: &str) -> bool {
        let Some(provided) = query_value(url, SIGNATURE_KEY) else {
            return false;
        };
        if provided.is_empty() {
            return false;
        }

        let expected = compute_signature(&self.secret, &strip_query_params(url, &[SIGNATURE_KEY]));
        signatures_match(&provided, &expected)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}
