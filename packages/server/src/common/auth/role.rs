//! User roles gating access to handler groups.
//!
//! Roles are stored as strings on the user row and carried in JWT claims.
//! Route handlers check them through `AuthUser` guard methods rather than
//! per-route middleware, mirroring how visibility scoping also needs the
//! role at query-building time.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Browses campaigns and makes donations.
    Donor,
    /// Owns an organisation and manages its campaigns.
    OrgOwner,
    /// Reviews organisation applications and campaign submissions.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::OrgOwner => "org_owner",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its database/claims representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donor" => Some(Self::Donor),
            "org_owner" => Some(Self::OrgOwner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
