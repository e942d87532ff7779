//! Expiry handling: clocks, expiry inputs and the `_expires` check.
//!
//! An expiry may be given as an absolute instant, a number of seconds from
//! now, a [`TimeDelta`] or a relative-time phrase such as `"+1 hour"`,
//! `"tomorrow"` or `"3 days ago"`. Whatever the input, it is resolved to an
//! absolute instant (whole seconds, UTC) at the moment it is given, and only
//! that timestamp is signed.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use tracing::debug;

use crate::canonical::EXPIRES_AT_KEY;
use crate::error::{SignedUrlError, VerificationError};
use crate::request::SignableRequest;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant, for simulated time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create a clock that always returns `at`.
    #[must_use]
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Create a clock at the given Unix timestamp.
    ///
    /// Out-of-range timestamps saturate to the Unix epoch.
    #[must_use]
    pub fn at_timestamp(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// When a signed URL should stop being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
    /// An exact instant.
    At(DateTime<Utc>),
    /// Number of seconds from now (may be negative).
    Seconds(i64),
    /// A duration from now (may be negative).
    Duration(TimeDelta),
    /// A relative-time phrase or date string, e.g. `"+1 hour"` or `"tomorrow"`.
    Phrase(String),
}

impl Expiry {
    /// Resolve to an absolute instant, truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SignedUrlError::InvalidExpiry`] if the input cannot be
    /// parsed or falls outside the representable range.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SignedUrlError> {
        let resolved = match self {
            Self::At(at) => Some(*at),
            Self::Seconds(secs) => offset_seconds(now, *secs),
            Self::Duration(delta) => now.checked_add_signed(*delta),
            Self::Phrase(phrase) => parse_phrase(phrase, now),
        };

        resolved
            .and_then(|at| DateTime::from_timestamp(at.timestamp(), 0))
            .ok_or_else(|| SignedUrlError::InvalidExpiry {
                input: self.to_string(),
            })
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(at) => write!(f, "{}", at.to_rfc3339()),
            Self::Seconds(secs) => write!(f, "{secs} seconds"),
            Self::Duration(delta) => write!(f, "{delta}"),
            Self::Phrase(phrase) => write!(f, "\"{phrase}\""),
        }
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<DateTime<FixedOffset>> for Expiry {
    fn from(at: DateTime<FixedOffset>) -> Self {
        Self::At(at.with_timezone(&Utc))
    }
}

impl From<SystemTime> for Expiry {
    fn from(at: SystemTime) -> Self {
        Self::At(at.into())
    }
}

impl From<i64> for Expiry {
    fn from(secs: i64) -> Self {
        Self::Seconds(secs)
    }
}

impl From<i32> for Expiry {
    fn from(secs: i32) -> Self {
        Self::Seconds(i64::from(secs))
    }
}

impl From<u32> for Expiry {
    fn from(secs: u32) -> Self {
        Self::Seconds(i64::from(secs))
    }
}

impl From<TimeDelta> for Expiry {
    fn from(delta: TimeDelta) -> Self {
        Self::Duration(delta)
    }
}

impl From<&str> for Expiry {
    fn from(phrase: &str) -> Self {
        Self::Phrase(phrase.to_owned())
    }
}

impl From<String> for Expiry {
    fn from(phrase: String) -> Self {
        Self::Phrase(phrase)
    }
}

/// Check the `_expires` parameter of a request against `now`.
///
/// An absent, zero or non-integer `_expires` means "no expiry".
pub(crate) fn check_expiration(
    request: &SignableRequest,
    now: DateTime<Utc>,
) -> Result<(), VerificationError> {
    let expires = request.get_int(EXPIRES_AT_KEY).unwrap_or(0);
    if expires == 0 || now.timestamp() <= expires {
        return Ok(());
    }

    debug!(expires, now = now.timestamp(), "Signed URL has expired");

    Err(VerificationError::Expired {
        url: request.uri().to_owned(),
        expired_at: DateTime::from_timestamp(expires, 0).unwrap_or(DateTime::<Utc>::MIN_UTC),
    })
}

/// Parse a phrase or date string relative to `now`.
fn parse_phrase(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(ts) = trimmed.strip_prefix('@') {
        return DateTime::from_timestamp(ts.parse().ok()?, 0);
    }
    if let Ok(secs) = trimmed.parse::<i64>() {
        return offset_seconds(now, secs);
    }
    if let Some(at) = parse_absolute(trimmed) {
        return Some(at);
    }

    parse_relative(&trimmed.to_ascii_lowercase(), now)
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD` (UTC midnight).
fn parse_absolute(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(at.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// `[anchor] [in] ([+|-]N unit)* [ago]`
fn parse_relative(phrase: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut tokens: Vec<&str> = phrase.split_whitespace().collect();

    let negate = tokens.last() == Some(&"ago");
    if negate {
        tokens.pop();
    }

    let mut at = now;
    let mut rest = tokens.as_slice();
    let mut anchored = false;

    if let Some((first, tail)) = rest.split_first() {
        if let Some(anchor) = anchor(first, now) {
            at = anchor;
            rest = tail;
            anchored = true;
        }
    }
    if let Some((&"in", tail)) = rest.split_first() {
        rest = tail;
    }

    if rest.is_empty() {
        return (anchored && !negate).then_some(at);
    }
    if rest.len() % 2 != 0 {
        return None;
    }

    for term in rest.chunks_exact(2) {
        let amount: i64 = term[0].strip_prefix('+').unwrap_or(term[0]).parse().ok()?;
        let amount = if negate { amount.checked_neg()? } else { amount };
        at = apply_unit(at, amount, term[1])?;
    }

    Some(at)
}

/// Resolve an anchor word to an instant.
fn anchor(word: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    match word {
        "now" => Some(now),
        "today" | "midnight" => Some(midnight),
        "noon" => midnight.checked_add_signed(TimeDelta::try_hours(12)?),
        "tomorrow" => midnight.checked_add_signed(TimeDelta::try_days(1)?),
        "yesterday" => midnight.checked_sub_signed(TimeDelta::try_days(1)?),
        _ => None,
    }
}

/// Add `amount` of `unit` to `at`.
fn apply_unit(at: DateTime<Utc>, amount: i64, unit: &str) -> Option<DateTime<Utc>> {
    let seconds_per_unit: i64 = match unit {
        "sec" | "secs" | "second" | "seconds" => 1,
        "min" | "mins" | "minute" | "minutes" => 60,
        "hour" | "hours" => 3_600,
        "day" | "days" => 86_400,
        "week" | "weeks" => 604_800,
        "fortnight" | "fortnights" => 1_209_600,
        "month" | "months" => return add_months(at, amount),
        "year" | "years" => return add_months(at, amount.checked_mul(12)?),
        _ => return None,
    };

    offset_seconds(at, amount.checked_mul(seconds_per_unit)?)
}

/// Calendar-aware month arithmetic.
fn add_months(at: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        at.checked_add_months(count)
    } else {
        at.checked_sub_months(count)
    }
}

fn offset_seconds(at: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    at.checked_add_signed(TimeDelta::try_seconds(secs)?)
}
