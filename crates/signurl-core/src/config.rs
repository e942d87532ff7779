//! Configuration for signed URL services.
//!
//! All configuration is driven by environment variables.

use std::fmt;
use std::sync::Arc;

use crate::error::{SignedUrlError, SignedUrlResult};
use crate::generator::UrlGenerator;
use crate::router::PathRouter;
use crate::signer::Signer;
use crate::verifier::Verifier;

/// Configuration for signing and verifying URLs.
#[derive(Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignedUrlConfig {
    /// Primary HMAC secret.
    pub secret: String,
    /// Scheme and authority used for absolute URLs.
    pub base_url: String,
    /// Route table as `(name, path template)` pairs.
    pub routes: Vec<(String, String)>,
    /// Log level.
    pub log_level: String,
}

impl Default for SignedUrlConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            base_url: "http://localhost".to_owned(),
            routes: Vec::new(),
            log_level: "info".to_owned(),
        }
    }
}

impl fmt::Debug for SignedUrlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedUrlConfig")
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("routes", &self.routes)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl SignedUrlConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if `SIGNED_URL_ROUTES` is malformed.
    pub fn from_env() -> SignedUrlResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if `SIGNED_URL_ROUTES` is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SignedUrlResult<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("SIGNED_URL_SECRET") {
            config.secret = v;
        }
        if let Some(v) = lookup("SIGNED_URL_BASE_URL") {
            config.base_url = v;
        }
        if let Some(v) = lookup("SIGNED_URL_ROUTES") {
            config.routes = parse_routes(&v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }

    /// Check that the configuration can be used to sign URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if the secret is empty or the base
    /// URL is invalid.
    pub fn validate(&self) -> SignedUrlResult<()> {
        if self.secret.is_empty() {
            return Err(SignedUrlError::Config(
                "SIGNED_URL_SECRET must not be empty".to_owned(),
            ));
        }
        self.router().map(|_| ())
    }

    /// Build the router described by `base_url` and `routes`.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if the base URL is invalid.
    pub fn router(&self) -> SignedUrlResult<PathRouter> {
        let mut router = PathRouter::new(&self.base_url)
            .map_err(|e| SignedUrlError::Config(e.to_string()))?;
        for (name, template) in &self.routes {
            router.add_route(name.clone(), template.clone());
        }
        Ok(router)
    }

    /// Build a signer from this configuration, using `router` for URLs.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if the configuration is invalid.
    pub fn signer_with(&self, router: PathRouter) -> SignedUrlResult<Arc<Signer>> {
        if self.secret.is_empty() {
            return Err(SignedUrlError::Config(
                "SIGNED_URL_SECRET must not be empty".to_owned(),
            ));
        }
        Ok(Arc::new(Signer::new(Arc::new(router), &self.secret)))
    }

    /// Build a generator and a verifier sharing one signer.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::Config`] if the configuration is invalid.
    pub fn build(&self) -> SignedUrlResult<(UrlGenerator, Verifier)> {
        self.validate()?;
        let signer = self.signer_with(self.router()?)?;
        Ok((UrlGenerator::new(Arc::clone(&signer)), Verifier::new(signer)))
    }
}

/// Parse `name=/path/{id},other=/other` into route pairs.
fn parse_routes(input: &str) -> SignedUrlResult<Vec<(String, String)>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, template) = entry
                .split_once('=')
                .ok_or_else(|| SignedUrlError::Config(format!("invalid route entry: {entry}")))?;
            let (name, template) = (name.trim(), template.trim());
            if name.is_empty() || template.is_empty() {
                return Err(SignedUrlError::Config(format!(
                    "invalid route entry: {entry}"
                )));
            }
            Ok((name.to_owned(), template.to_owned()))
        })
        .collect()
}
