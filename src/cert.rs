//! Certificate-issuance business rules: number derivation and the
//! grant-age alert threshold.

use chrono::NaiveDate;

/// Clients whose certificate is at least this many days old show up on
/// the dashboard alert list. The boundary is inclusive.
pub const NEAR_EXPIRY_DAYS: i64 = 300;

/// Derives the next certificate number from a specification's counter.
///
/// Numbers are plain integers incremented by one. The store advances the
/// counter in the same transaction that inserts the client, so a number
/// is issued exactly once per successful creation.
#[must_use]
pub fn next_certificate_number(last: i64) -> i64 {
    last + 1
}

/// Whole days elapsed since the certificate was granted. Negative when
/// the grant date lies in the future.
#[must_use]
pub fn days_since_grant(grant_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - grant_date).num_days()
}

/// Whether a certificate granted on `grant_date` is near expiry as of
/// `today`.
#[must_use]
pub fn is_near_expiry(grant_date: NaiveDate, today: NaiveDate) -> bool {
    days_since_grant(grant_date, today) >= NEAR_EXPIRY_DAYS
}
