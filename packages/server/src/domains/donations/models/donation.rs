use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::{CampaignId, DonationId, OrganisationId, UserId};

/// Minimum accepted donation, in whole dollars.
pub const MIN_AMOUNT: i64 = 5;
/// Maximum accepted donation, in whole dollars.
pub const MAX_AMOUNT: i64 = 1_000_000;

/// Donation - a donor's contribution to a campaign.
///
/// Amounts are whole dollars. Each donation carries a human-readable
/// reference number that is unique across the system.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Donation {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub donor_id: UserId,
    pub amount: i64,
    pub reference_number: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Donation joined with its campaign title and donor display name, the
/// shape shown in donation lists and receipts.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DonationRecord {
    pub id: DonationId,
    pub campaign_id: CampaignId,
    pub campaign_title: String,
    pub organisation_id: OrganisationId,
    pub donor_id: UserId,
    pub donor_name: String,
    pub amount: i64,
    pub reference_number: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-donor aggregate for the donor dashboard.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DonorSummary {
    pub donation_count: i64,
    pub total_donated: i64,
    pub campaigns_supported: i64,
}

/// Check a donation amount against the accepted bounds.
pub fn is_valid_amount(amount: i64) -> bool {
    (MIN_AMOUNT..=MAX_AMOUNT).contains(&amount)
}

const RECORD_SELECT: &str = r#"
    SELECT
        d.id,
        d.campaign_id,
        c.title AS campaign_title,
        c.organisation_id,
        d.donor_id,
        COALESCE(
            NULLIF(TRIM(u.first_name || ' ' || u.last_name), ''),
            u.username
        ) AS donor_name,
        d.amount,
        d.reference_number,
        d.comment,
        d.created_at
    FROM donations d
    JOIN campaigns c ON c.id = d.campaign_id
    JOIN users u ON u.id = d.donor_id
"#;

// =============================================================================
// SQL Queries
// =============================================================================

impl Donation {
    /// Insert new donation
    pub async fn insert(&self, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO donations (
                id, campaign_id, donor_id, amount, reference_number,
                comment, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(self.campaign_id)
        .bind(self.donor_id)
        .bind(self.amount)
        .bind(&self.reference_number)
        .bind(&self.comment)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Look up a donation record by its reference number
    pub async fn find_by_reference(
        reference: &str,
        pool: &PgPool,
    ) -> Result<Option<DonationRecord>> {
        let sql = format!("{} WHERE d.reference_number = $1", RECORD_SELECT);
        sqlx::query_as::<_, DonationRecord>(&sql)
            .bind(reference)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Newest-first page of a donor's own donations
    pub async fn find_by_donor_page(
        donor_id: UserId,
        limit: i64,
        cursor: Option<DonationId>,
        pool: &PgPool,
    ) -> Result<Vec<DonationRecord>> {
        let sql = format!(
            r#"{}
            WHERE d.donor_id = $1
              AND ($3::uuid IS NULL OR d.id < $3)
            ORDER BY d.id DESC
            LIMIT $2
            "#,
            RECORD_SELECT
        );
        sqlx::query_as::<_, DonationRecord>(&sql)
            .bind(donor_id)
            .bind(limit)
            .bind(cursor)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Newest-first page of donations across an organisation's campaigns,
    /// optionally narrowed to one campaign
    pub async fn find_by_organisation_page(
        organisation_id: OrganisationId,
        campaign_id: Option<CampaignId>,
        limit: i64,
        cursor: Option<DonationId>,
        pool: &PgPool,
    ) -> Result<Vec<DonationRecord>> {
        let sql = format!(
            r#"{}
            WHERE c.organisation_id = $1
              AND ($3::uuid IS NULL OR d.campaign_id = $3)
              AND ($4::uuid IS NULL OR d.id < $4)
            ORDER BY d.id DESC
            LIMIT $2
            "#,
            RECORD_SELECT
        );
        sqlx::query_as::<_, DonationRecord>(&sql)
            .bind(organisation_id)
            .bind(limit)
            .bind(campaign_id)
            .bind(cursor)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// All donations across an organisation's campaigns, oldest first.
    ///
    /// Unpaginated; feeds the CSV export.
    pub async fn find_all_by_organisation(
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<Vec<DonationRecord>> {
        let sql = format!(
            "{} WHERE c.organisation_id = $1 ORDER BY d.created_at",
            RECORD_SELECT
        );
        sqlx::query_as::<_, DonationRecord>(&sql)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Most recent donations to a campaign (public campaign detail)
    pub async fn find_recent_by_campaign(
        campaign_id: CampaignId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<DonationRecord>> {
        let sql = format!(
            "{} WHERE d.campaign_id = $1 ORDER BY d.id DESC LIMIT $2",
            RECORD_SELECT
        );
        sqlx::query_as::<_, DonationRecord>(&sql)
            .bind(campaign_id)
            .bind(limit)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Aggregate stats for a donor's dashboard
    pub async fn donor_summary(donor_id: UserId, pool: &PgPool) -> Result<DonorSummary> {
        sqlx::query_as::<_, DonorSummary>(
            r#"
            SELECT
                COUNT(*) AS donation_count,
                COALESCE(SUM(amount), 0) AS total_donated,
                COUNT(DISTINCT campaign_id) AS campaigns_supported
            FROM donations
            WHERE donor_id = $1
            "#,
        )
        .bind(donor_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
