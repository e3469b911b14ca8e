//! Donation reference numbers.
//!
//! Format: `DON-{unix-timestamp}-{donor-suffix}`. Not collision-resistant;
//! the unique constraint on `donations.reference_number` is the backstop,
//! and a collision surfaces as a conflict error to the caller.

use chrono::Utc;

use crate::common::UserId;

/// Build a reference number for a donation by the given donor.
pub fn generate(donor_id: UserId) -> String {
    let timestamp = Utc::now().timestamp();
    let suffix = &donor_id.as_uuid().simple().to_string()[..8];
    format!("DON-{}-{}", timestamp, suffix)
}
