//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (donors, org owners, admins).
pub struct User;

/// Marker type for Organisation entities.
pub struct Organisation;

/// Marker type for Campaign entities.
pub struct Campaign;

/// Marker type for Donation entities.
pub struct Donation;

/// Marker type for Tag entities.
pub struct Tag;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Organisation entities.
pub type OrganisationId = Id<Organisation>;

/// Typed ID for Campaign entities.
pub type CampaignId = Id<Campaign>;

/// Typed ID for Donation entities.
pub type DonationId = Id<Donation>;

/// Typed ID for Tag entities.
pub type TagId = Id<Tag>;
