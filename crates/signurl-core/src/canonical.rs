//! Canonical string handling and HMAC computation for signed URLs.
//!
//! A signature is computed over the URL exactly as it was produced, minus
//! the parameters that are appended after the signature:
//!
//! ```text
//! base      = router output (may contain `_expires`)
//! token-sig = HMAC-SHA256(token,  base)               -> `_token`
//! hash      = HMAC-SHA256(secret, base + `_token`)    -> `_hash`
//! ```
//!
//! Both sides derive the message with [`strip_query_params`]: reserved pairs
//! are removed from the raw query string and the remaining pairs are neither
//! decoded, sorted nor re-encoded, so the canonical string is byte-for-byte
//! the one that was signed. Fragments and empty pairs are never part of the
//! canonical string.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Query key carrying the primary signature.
pub const SIGNATURE_KEY: &str = "_hash";

/// Query key carrying the expiry as a Unix timestamp.
pub const EXPIRES_AT_KEY: &str = "_expires";

/// Query key carrying the single-use signature.
pub const SINGLE_USE_TOKEN_KEY: &str = "_token";

/// All reserved query keys. Route parameters must not use them.
pub const RESERVED_KEYS: [&str; 3] = [SIGNATURE_KEY, EXPIRES_AT_KEY, SINGLE_USE_TOKEN_KEY];

/// Compute `base64url(HMAC-SHA256(key, message))` without padding.
///
/// # Examples
///
/// ```
/// use signurl_core::canonical::compute_signature;
///
/// let sig = compute_signature(b"1234", "http://localhost/route1");
/// assert_eq!(sig, compute_signature(b"1234", "http://localhost/route1"));
/// assert_ne!(sig, compute_signature(b"4321", "http://localhost/route1"));
/// ```
#[must_use]
pub fn compute_signature(key: &[u8], message: &str) -> String {
    let mut mac =
        <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC can accept any key length");
    mac.update(message.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Compare two signatures in constant time.
#[must_use]
pub fn signatures_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Split a URL into the part before `#` and the fragment, if any.
#[must_use]
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    }
}

/// The raw query string of a URL (without `?` and without fragment).
#[must_use]
pub fn raw_query(url: &str) -> Option<&str> {
    let (base, _) = split_fragment(url);
    base.split_once('?').map(|(_, query)| query)
}

/// Append `key=value` to the query string of `url`, keeping any fragment at
/// the end.
///
/// # Examples
///
/// ```
/// use signurl_core::canonical::append_query_param;
///
/// assert_eq!(append_query_param("/a", "_hash", "x"), "/a?_hash=x");
/// assert_eq!(append_query_param("/a?b=1", "_hash", "x"), "/a?b=1&_hash=x");
/// assert_eq!(append_query_param("/a?b=1#top", "_hash", "x"), "/a?b=1&_hash=x#top");
/// ```
#[must_use]
pub fn append_query_param(url: &str, key: &str, value: &str) -> String {
    let (base, fragment) = split_fragment(url);

    let mut out = String::with_capacity(url.len() + key.len() + value.len() + 2);
    out.push_str(base);
    match base.find('?') {
        None => out.push('?'),
        Some(_) if base.ends_with('?') || base.ends_with('&') => {}
        Some(_) => out.push('&'),
    }
    out.extend(form_urlencoded::byte_serialize(key.as_bytes()));
    out.push('=');
    out.extend(form_urlencoded::byte_serialize(value.as_bytes()));

    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Remove every pair whose (decoded) key is in `keys` from the raw query
/// string. The remaining pairs keep their original bytes and order. The
/// fragment is dropped. If no pairs remain the `?` is dropped as well.
///
/// # Examples
///
/// ```
/// use signurl_core::canonical::strip_query_params;
///
/// assert_eq!(strip_query_params("/a?z=1&_hash=x&b=%20", &["_hash"]), "/a?z=1&b=%20");
/// assert_eq!(strip_query_params("/a?_hash=x", &["_hash"]), "/a");
/// ```
#[must_use]
pub fn strip_query_params(url: &str, keys: &[&str]) -> String {
    let (base, _) = split_fragment(url);
    let Some((path, query)) = base.split_once('?') else {
        return base.to_owned();
    };

    let kept = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = decoded_key(pair);
            !keys.iter().any(|reserved| *reserved == key)
        })
        .collect::<Vec<_>>()
        .join("&");

    if kept.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{kept}")
    }
}

/// The decoded value of the first query pair named `key`.
#[must_use]
pub fn query_value(url: &str, key: &str) -> Option<String> {
    let query = raw_query(url)?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Decode the key of a single raw `key=value` pair.
fn decoded_key(pair: &str) -> String {
    let raw_key = pair.split_once('=').map_or(pair, |(k, _)| k);
    form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .map(|(k, _)| k.into_owned())
        .unwrap_or_default()
}
