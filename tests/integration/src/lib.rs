//! Integration tests for signed URL generation and verification.
//!
//! These exercise the public API end to end: a generator and a verifier are
//! built the way an application would build them, sharing or not sharing a
//! secret, and driven by a fixed clock where time matters.
//!
//! Run them with:
//! ```text
//! cargo test -p signurl-integration
//! ```

use std::sync::{Arc, Once};

use signurl_core::{FixedClock, PathRouter, Signer, UrlGenerator, Verifier};

static INIT: Once = Once::new();

/// 2023-11-14T22:13:20Z.
pub const NOW: i64 = 1_700_000_000;

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The router used by every test.
#[must_use]
pub fn router() -> PathRouter {
    PathRouter::localhost()
        .with_route("route1", "/route1")
        .with_route("confirm", "/users/{id}/confirm")
        .with_route("download", "/files/{name}")
}

/// A signer with the given secret and a clock fixed at `now`.
#[must_use]
pub fn signer_at(secret: &str, now: i64) -> Arc<Signer> {
    init_tracing();
    tracing::debug!(now, "creating signer with fixed clock");
    Arc::new(
        Signer::new(Arc::new(router()), secret)
            .with_clock(Arc::new(FixedClock::at_timestamp(now))),
    )
}

/// A generator with the given secret at [`NOW`].
#[must_use]
pub fn generator(secret: &str) -> UrlGenerator {
    UrlGenerator::new(signer_at(secret, NOW))
}

/// A verifier with the given secret at [`NOW`].
#[must_use]
pub fn verifier(secret: &str) -> Verifier {
    verifier_at(secret, NOW)
}

/// A verifier with the given secret and a clock fixed at `now`.
#[must_use]
pub fn verifier_at(secret: &str, now: i64) -> Verifier {
    Verifier::new(signer_at(secret, now))
}

mod test_expiry;
mod test_request;
mod test_signing;
mod test_single_use;
