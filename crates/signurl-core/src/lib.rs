//! Signed, temporary and single-use URLs.
//!
//! This crate generates URLs carrying an HMAC-SHA256 signature (`_hash`) and
//! verifies them later. A URL may additionally carry an expiration timestamp
//! (`_expires`) and a single-use token (`_token`) that binds it to some
//! caller-owned state, so that changing the state invalidates the URL.
//!
//! # Overview
//!
//! A [`Signer`] holds the primary secret, a [`Router`] that turns route names
//! into URLs, and a [`Clock`]. A [`UrlGenerator`] hands out [`Builder`]s that
//! accumulate parameters, expiry and token before producing a [`SignedUrl`].
//! A [`Verifier`] checks signature, expiry and single-use binding in that
//! order and reports the first failure as a [`VerificationError`].
//!
//! A builder is turned into its URL string with [`Builder::to_url`], which is
//! [`Builder::create`] followed by taking the URL. `Builder` has no `Display`
//! impl since signing can fail.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use signurl_core::{Parameters, PathRouter, Signer, UrlGenerator, Verifier};
//!
//! let router = PathRouter::localhost().with_route("reset", "/reset/{user}");
//! let signer = Arc::new(Signer::new(Arc::new(router), "secret"));
//! let generator = UrlGenerator::new(Arc::clone(&signer));
//! let verifier = Verifier::new(signer);
//!
//! let url = generator
//!     .single_use("reset", Parameters::new().with("user", "alice"), "old-hash")
//!     .unwrap();
//!
//! assert!(verifier.verify(&url, Some(&"old-hash".into())).is_ok());
//! assert!(verifier.verify(&url, Some(&"new-hash".into())).is_err());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Query manipulation and HMAC computation
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Error types
//! - [`expiry`] - Clocks and expiration parsing
//! - [`request`] - Verifiable requests and the current-request context
//! - [`router`] - Route rendering

mod builder;
pub mod canonical;
pub mod config;
pub mod error;
pub mod expiry;
mod generator;
pub mod request;
pub mod router;
mod signed_url;
mod signer;
mod single_use;
mod verifier;

pub use builder::Builder;
pub use config::SignedUrlConfig;
pub use error::{SignedUrlError, SignedUrlResult, VerificationError, VerificationErrorKind};
pub use expiry::{Clock, Expiry, FixedClock, SystemClock};
pub use generator::UrlGenerator;
pub use request::{RequestContext, RequestStack, SignableRequest};
pub use router::{ParamValue, Parameters, PathRouter, ReferenceType, RouteError, Router};
pub use signed_url::SignedUrl;
pub use signer::Signer;
pub use single_use::SingleUseToken;
pub use verifier::Verifier;
