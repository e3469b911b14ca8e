use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CampaignId, OrganisationId, UserId};

/// The fixed campaign categories offered to organisations.
pub const CATEGORIES: &[&str] = &[
    "education",
    "healthcare",
    "environment",
    "poverty",
    "arts",
    "disaster",
    "community",
    "animals",
    "technology",
    "other",
];

/// Whether a category string is one of the fixed choices.
pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// Campaign - a fundraising initiative owned by an organisation.
///
/// Status workflow: owner submissions land in `pending`; an administrator
/// moves them to `active` or `rejected`; owners may close active campaigns
/// and reactivate closed ones. Only drafts can be deleted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Campaign {
    pub id: CampaignId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub funding_goal: Decimal,
    pub category: String,
    pub cover_image: Option<String>,
    pub organisation_id: OrganisationId,
    pub created_by: Option<UserId>,
    pub status: String, // 'draft' | 'pending' | 'active' | 'rejected' | 'closed'
    pub rejection_reason: Option<String>,
    pub admin_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Status enum for type-safe transitions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Pending,
    Active,
    Rejected,
    Closed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "rejected" => Some(Self::Rejected),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Donation aggregates for a single campaign.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CampaignStats {
    pub total_raised: i64,
    pub donor_count: i64,
}

impl Campaign {
    pub fn status(&self) -> Option<CampaignStatus> {
        CampaignStatus::parse(&self.status)
    }

    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Percentage of the funding goal reached, capped at 100.
    pub fn progress_percent(&self, total_raised: i64) -> i32 {
        if self.funding_goal <= Decimal::ZERO {
            return 0;
        }
        let pct = Decimal::from(total_raised) * Decimal::from(100) / self.funding_goal;
        let pct: i32 = pct.trunc().try_into().unwrap_or(100);
        pct.min(100)
    }

    /// Days the campaign has been running (up to closure, if closed).
    pub fn days_active(&self, now: DateTime<Utc>) -> i64 {
        let end = self.closed_at.unwrap_or(now);
        (end - self.created_at).num_days().max(0)
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl Campaign {
    /// Find campaign by ID
    pub async fn find_by_id(id: CampaignId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find campaign by slug
    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM campaigns WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Newest-first page of active campaigns with optional filters
    /// (public browsing).
    pub async fn find_active_page(
        limit: i64,
        cursor: Option<CampaignId>,
        category: Option<&str>,
        organisation_id: Option<OrganisationId>,
        tag_slug: Option<&str>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT c.* FROM campaigns c
            WHERE c.status = 'active'
              AND ($2::uuid IS NULL OR c.id < $2)
              AND ($3::text IS NULL OR c.category = $3)
              AND ($4::uuid IS NULL OR c.organisation_id = $4)
              AND ($5::text IS NULL OR EXISTS (
                    SELECT 1 FROM campaign_tags ct
                    JOIN tags t ON t.id = ct.tag_id
                    WHERE ct.campaign_id = c.id AND t.slug = $5))
            ORDER BY c.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .bind(cursor)
        .bind(category)
        .bind(organisation_id)
        .bind(tag_slug)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Active campaigns of one organisation (public profile)
    pub async fn find_active_by_organisation(
        organisation_id: OrganisationId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM campaigns
            WHERE organisation_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(organisation_id)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// All campaigns of one organisation, newest first (owner listing)
    pub async fn find_by_organisation(
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM campaigns WHERE organisation_id = $1 ORDER BY created_at DESC",
        )
        .bind(organisation_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending submissions, oldest first (admin review queue)
    pub async fn find_pending(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM campaigns WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert new campaign
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO campaigns (
                id, title, slug, description, funding_goal, category, cover_image,
                organisation_id, created_by, status, rejection_reason, admin_remarks,
                created_at, updated_at, closed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.slug)
        .bind(&self.description)
        .bind(self.funding_goal)
        .bind(&self.category)
        .bind(&self.cover_image)
        .bind(self.organisation_id)
        .bind(self.created_by)
        .bind(&self.status)
        .bind(&self.rejection_reason)
        .bind(&self.admin_remarks)
        .bind(self.created_at)
        .bind(self.updated_at)
        .bind(self.closed_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Update owner-editable fields. `status` carries the resubmission
    /// rule: editing a rejected campaign returns it to pending.
    pub async fn update_content(
        id: CampaignId,
        title: &str,
        description: &str,
        funding_goal: Decimal,
        category: &str,
        cover_image: Option<&str>,
        status: CampaignStatus,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE campaigns
            SET title = $2,
                description = $3,
                funding_goal = $4,
                category = $5,
                cover_image = $6,
                status = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(funding_goal)
        .bind(category)
        .bind(cover_image)
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Close an active campaign, stamping `closed_at`.
    ///
    /// Guarded in SQL: only transitions rows that are currently active
    /// and belong to the given organisation.
    pub async fn close(
        id: CampaignId,
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE campaigns
            SET status = 'closed', closed_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND organisation_id = $2 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(organisation_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Reactivate a closed campaign, clearing `closed_at`.
    pub async fn reactivate(
        id: CampaignId,
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE campaigns
            SET status = 'active', closed_at = NULL, updated_at = NOW()
            WHERE id = $1 AND organisation_id = $2 AND status = 'closed'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(organisation_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete a draft campaign. Returns whether a row was deleted.
    pub async fn delete_draft(
        id: CampaignId,
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM campaigns WHERE id = $1 AND organisation_id = $2 AND status = 'draft'",
        )
        .bind(id)
        .bind(organisation_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin review decision: approve (active) or reject (rejected,
    /// with reason). Only pending campaigns are affected.
    pub async fn review(
        id: CampaignId,
        status: CampaignStatus,
        rejection_reason: Option<&str>,
        admin_remarks: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE campaigns
            SET status = $2,
                rejection_reason = $3,
                admin_remarks = $4,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(rejection_reason)
        .bind(admin_remarks)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Donation aggregates for this campaign
    pub async fn stats(id: CampaignId, pool: &PgPool) -> Result<CampaignStats> {
        sqlx::query_as::<_, CampaignStats>(
            r#"
            SELECT
                COALESCE(SUM(amount), 0)::bigint AS total_raised,
                COUNT(DISTINCT donor_id) AS donor_count
            FROM donations
            WHERE campaign_id = $1
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

    fn sample_campaign(goal: i64) -> Campaign {
        let id = CampaignId::new();
        Campaign {
            id,
            title: "Test".to_string(),
            slug: format!("test-{}", &id.as_uuid().simple().to_string()[..8]),
            description: "A test campaign".to_string(),
            funding_goal: Decimal::from(goal),
            category: "education".to_string(),
            cover_image: None,
            organisation_id: OrganisationId::new(),
            created_by: None,
            status: "active".to_string(),
            rejection_reason: None,
            admin_remarks: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Pending,
            CampaignStatus::Active,
            CampaignStatus::Rejected,
            CampaignStatus::Closed,
        ] {
            assert_eq!(CampaignStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_progress_percent() {
        let campaign = sample_campaign(1000);
        assert_eq!(campaign.progress_percent(0), 0);
        assert_eq!(campaign.progress_percent(250), 25);
        assert_eq!(campaign.progress_percent(999), 99);
        assert_eq!(campaign.progress_percent(1000), 100);
    }

    #[test]
    fn test_progress_percent_caps_at_100() {
        let campaign = sample_campaign(100);
        assert_eq!(campaign.progress_percent(150), 100);
    }

    #[test]
    fn test_progress_percent_zero_goal() {
        let campaign = sample_campaign(0);
        assert_eq!(campaign.progress_percent(500), 0);
    }

    #[test]
    fn test_days_active_uses_closed_at() {
        let mut campaign = sample_campaign(100);
        campaign.created_at = Utc::now() - chrono::Duration::days(10);
        campaign.closed_at = Some(campaign.created_at + chrono::Duration::days(4));
        assert_eq!(campaign.days_active(Utc::now()), 4);

        campaign.closed_at = None;
        assert_eq!(campaign.days_active(Utc::now()), 10);
    }

    #[test]
    fn test_category_validation() {
        assert!(is_valid_category("education"));
        assert!(is_valid_category("other"));
        assert!(!is_valid_category("crypto"));
    }
}
