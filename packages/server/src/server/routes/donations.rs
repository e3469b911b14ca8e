//! Donation creation, receipts, and donor history.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{build_page, CampaignId, DonationId, Page, PaginationArgs, Role};
use crate::domains::campaigns::models::Campaign;
use crate::domains::donations::models::{
    is_valid_amount, Donation, DonationRecord, DonorSummary, MAX_AMOUNT, MIN_AMOUNT,
};
use crate::domains::donations::reference;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_donation))
        .route("/mine", get(my_donations))
        .route("/summary", get(donor_summary))
        .route("/:reference", get(donation_by_reference))
}

#[derive(Deserialize)]
pub struct CreateDonationRequest {
    pub campaign_id: Uuid,
    pub amount: i64,
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct DonorSummaryResponse {
    #[serde(flatten)]
    pub summary: DonorSummary,
    pub recent_donations: Vec<DonationRecord>,
}

async fn create_donation(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Json(req): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<Donation>), ApiError> {
    auth.require_donor()?;

    if !is_valid_amount(req.amount) {
        return Err(ApiError::BadRequest(format!(
            "donation amount must be between {} and {} dollars",
            MIN_AMOUNT, MAX_AMOUNT
        )));
    }

    let campaign = Campaign::find_by_id(CampaignId::from_uuid(req.campaign_id), &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("campaign not found".to_string()))?;
    if !campaign.is_active() {
        return Err(ApiError::Conflict(
            "campaign is not accepting donations".to_string(),
        ));
    }

    let donation = Donation {
        id: DonationId::new(),
        campaign_id: campaign.id,
        donor_id: auth.user_id,
        amount: req.amount,
        reference_number: reference::generate(auth.user_id),
        comment: req.comment,
        created_at: Utc::now(),
    };
    let donation = donation.insert(&state.db_pool).await?;

    Ok((StatusCode::CREATED, Json(donation)))
}

async fn my_donations(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Query(args): Query<PaginationArgs>,
) -> Result<Json<Page<DonationRecord>>, ApiError> {
    auth.require_donor()?;
    let args = args
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !args.is_forward() {
        return Err(ApiError::BadRequest(
            "backward pagination is not supported".to_string(),
        ));
    }

    let donations = Donation::find_by_donor_page(
        auth.user_id,
        args.fetch_limit(),
        args.cursor.map(DonationId::from_uuid),
        &state.db_pool,
    )
    .await?;

    Ok(Json(build_page(donations, &args, |d: &DonationRecord| {
        d.id.into_uuid()
    })))
}

/// Donor dashboard: lifetime aggregates plus the five most recent
/// donations.
async fn donor_summary(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<DonorSummaryResponse>, ApiError> {
    auth.require_donor()?;
    let summary = Donation::donor_summary(auth.user_id, &state.db_pool).await?;
    let recent_donations =
        Donation::find_by_donor_page(auth.user_id, 5, None, &state.db_pool).await?;

    Ok(Json(DonorSummaryResponse {
        summary,
        recent_donations,
    }))
}

/// Receipt lookup by reference number.
///
/// Admins see any donation; org owners see donations to their own
/// organisation's campaigns; donors see their own. Everything else is a
/// 404 so references cannot be probed.
async fn donation_by_reference(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(reference): Path<String>,
) -> Result<Json<DonationRecord>, ApiError> {
    let donation = Donation::find_by_reference(&reference, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("donation not found".to_string()))?;

    let visible = match auth.role {
        Role::Admin => true,
        Role::OrgOwner => auth.organisation_id == Some(donation.organisation_id),
        Role::Donor => donation.donor_id == auth.user_id,
    };
    if !visible {
        return Err(ApiError::NotFound("donation not found".to_string()));
    }

    Ok(Json(donation))
}
