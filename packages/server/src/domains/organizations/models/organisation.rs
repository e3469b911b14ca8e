use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::OrganisationId;

/// Organisation - anchor entity for campaigns and owner accounts.
///
/// Created as an application when an org owner registers; an administrator
/// then verifies or rejects it. `verified` is a denormalised mirror of
/// `verification_status` and is rewritten by every status transition.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Organisation {
    pub id: OrganisationId,
    pub name: String,
    pub website: Option<String>,
    pub mission: Option<String>,
    pub contact_phone: Option<String>,
    pub application_notes: Option<String>,
    pub admin_remarks: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub verification_status: String, // 'pending' | 'verified' | 'rejected'
    pub verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Verification status for type-safe transitions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Public projection for unauthenticated browsing (no application or
/// review fields).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicOrganisation {
    pub id: OrganisationId,
    pub name: String,
    pub website: Option<String>,
    pub mission: Option<String>,
    pub contact_phone: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
}

impl From<Organisation> for PublicOrganisation {
    fn from(org: Organisation) -> Self {
        PublicOrganisation {
            id: org.id,
            name: org.name,
            website: org.website,
            mission: org.mission,
            contact_phone: org.contact_phone,
            logo: org.logo,
            banner: org.banner,
        }
    }
}

/// Aggregate figures shown on organisation profiles and dashboards.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrganisationStats {
    pub campaign_count: i64,
    pub active_campaign_count: i64,
    pub pending_campaign_count: i64,
    pub total_raised: i64,
    pub donor_count: i64,
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Organisation {
    /// Find organisation by ID
    pub async fn find_by_id(id: OrganisationId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM organisations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find organisation by name (exact match)
    pub async fn find_by_name(name: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM organisations WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find an active, verified organisation (public detail)
    pub async fn find_public(id: OrganisationId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM organisations WHERE id = $1 AND is_active = TRUE AND verified = TRUE",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Newest-first page of active, verified organisations (public list)
    pub async fn find_public_page(
        limit: i64,
        cursor: Option<OrganisationId>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM organisations
            WHERE is_active = TRUE
              AND verified = TRUE
              AND ($2::uuid IS NULL OR id < $2)
            ORDER BY id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .bind(cursor)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending applications, oldest first (admin review queue)
    pub async fn find_pending(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM organisations WHERE verification_status = 'pending' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert new organisation.
    ///
    /// Takes an executor so registration can create the organisation and
    /// its owner account in one transaction.
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO organisations (
                id, name, website, mission, contact_phone, application_notes,
                admin_remarks, logo, banner, verification_status, verified,
                is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.website)
        .bind(&self.mission)
        .bind(&self.contact_phone)
        .bind(&self.application_notes)
        .bind(&self.admin_remarks)
        .bind(&self.logo)
        .bind(&self.banner)
        .bind(&self.verification_status)
        .bind(self.verified)
        .bind(self.is_active)
        .bind(self.created_at)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Update owner-editable settings
    pub async fn update_settings(
        id: OrganisationId,
        website: Option<&str>,
        mission: Option<&str>,
        contact_phone: Option<&str>,
        logo: Option<&str>,
        banner: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE organisations
            SET website = $2,
                mission = $3,
                contact_phone = $4,
                logo = $5,
                banner = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(website)
        .bind(mission)
        .bind(contact_phone)
        .bind(logo)
        .bind(banner)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Set verification status, rewriting the `verified` mirror in the
    /// same statement so the two can never diverge.
    pub async fn set_verification_status(
        id: OrganisationId,
        status: VerificationStatus,
        admin_remarks: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE organisations
            SET verification_status = $2,
                verified = ($2 = 'verified'),
                admin_remarks = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(admin_remarks)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Aggregate stats across this organisation's campaigns and donations
    pub async fn stats(id: OrganisationId, pool: &PgPool) -> Result<OrganisationStats> {
        sqlx::query_as::<_, OrganisationStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM campaigns WHERE organisation_id = $1) AS campaign_count,
                (SELECT COUNT(*) FROM campaigns
                  WHERE organisation_id = $1 AND status = 'active') AS active_campaign_count,
                (SELECT COUNT(*) FROM campaigns
                  WHERE organisation_id = $1 AND status = 'pending') AS pending_campaign_count,
                (SELECT COALESCE(SUM(d.amount), 0) FROM donations d
                  JOIN campaigns c ON c.id = d.campaign_id
                  WHERE c.organisation_id = $1) AS total_raised,
                (SELECT COUNT(DISTINCT d.donor_id) FROM donations d
                  JOIN campaigns c ON c.id = d.campaign_id
                  WHERE c.organisation_id = $1) AS donor_count
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_status_roundtrip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Verified,
            VerificationStatus::Rejected,
        ] {
            assert_eq!(VerificationStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_public_projection_drops_review_fields() {
        let org = Organisation {
            id: OrganisationId::new(),
            name: "Helping Hands".to_string(),
            website: None,
            mission: Some("Help people".to_string()),
            contact_phone: None,
            application_notes: Some("notes".to_string()),
            admin_remarks: Some("internal".to_string()),
            logo: None,
            banner: None,
            verification_status: "verified".to_string(),
            verified: true,
            is_active: true,
            created_at: Utc::now(),
        };
        let public = PublicOrganisation::from(org);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("admin_remarks").is_none());
        assert!(json.get("application_notes").is_none());
        assert_eq!(json["name"], "Helping Hands");
    }
}
