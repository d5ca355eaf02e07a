//! # Identity & Timestamp Provider
//!
//! Statement ids are ULIDs: globally unique and time-sortable.
//! Timestamps are RFC 3339 UTC strings with millisecond precision and a `Z`
//! suffix, so string order matches chronological order for store-assigned
//! times.

use crate::StoreError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::sync::Mutex;
use ulid::Ulid;

/// Generate a fresh statement id.
#[must_use]
pub fn new_statement_id() -> String {
    Ulid::new().to_string()
}

/// Render a wall time in the store's canonical timestamp form.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Check a caller-supplied timestamp and return it unchanged.
///
/// The original text is stored as given; only its RFC 3339 validity is checked.
pub fn validate_timestamp(raw: &str) -> Result<&str, StoreError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| {
        StoreError::InvalidArgument(format!(
            "statement_timestamp '{}' is not RFC 3339: {}",
            raw, e
        ))
    })?;
    Ok(raw)
}

// =============================================================================
// CLOCKS
// =============================================================================

/// Source of wall time for `created_at`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that advances by a fixed step on every reading.
///
/// Gives strictly increasing `created_at` values, which makes newest-first
/// ordering observable in tests and benches.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    /// Start at the Unix epoch and advance one millisecond per reading.
    #[must_use]
    pub fn from_epoch() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH, Duration::milliseconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let current = *next;
        *next = current + self.step;
        current
    }
}

// =============================================================================
// TESTS
// =============================================================================
