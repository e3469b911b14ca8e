//! Administrator review queues and user listing.

use axum::{
    extract::{Extension, Path, Query},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{build_page, CampaignId, OrganisationId, Page, PaginationArgs, UserId};
use crate::domains::accounts::models::{User, UserProfile};
use crate::domains::campaigns::models::{Campaign, CampaignStatus};
use crate::domains::organizations::models::{Organisation, VerificationStatus};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/organisations/pending", get(pending_organisations))
        .route("/organisations/:id/review", post(review_organisation))
        .route("/campaigns/pending", get(pending_campaigns))
        .route("/campaigns/:id/review", post(review_campaign))
        .route("/users", get(list_users))
}

#[derive(Deserialize)]
pub struct OrganisationReviewRequest {
    pub decision: VerificationStatus,
    pub remarks: Option<String>,
}

#[derive(Deserialize)]
pub struct CampaignReviewRequest {
    pub decision: CampaignStatus,
    pub rejection_reason: Option<String>,
    pub remarks: Option<String>,
}

/// A pending application together with the account that submitted it.
#[derive(Serialize)]
pub struct OrganisationApplication {
    pub organisation: Organisation,
    pub owner: Option<UserProfile>,
}

async fn pending_organisations(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<OrganisationApplication>>, ApiError> {
    auth.require_admin()?;
    let orgs = Organisation::find_pending(&state.db_pool).await?;

    let mut applications = Vec::with_capacity(orgs.len());
    for organisation in orgs {
        let owner = User::find_owner_of_organisation(organisation.id, &state.db_pool)
            .await?
            .map(|u| u.profile());
        applications.push(OrganisationApplication {
            organisation,
            owner,
        });
    }
    Ok(Json(applications))
}

/// Verify or reject a pending organisation application.
async fn review_organisation(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<OrganisationReviewRequest>,
) -> Result<Json<Organisation>, ApiError> {
    auth.require_admin()?;
    if req.decision == VerificationStatus::Pending {
        return Err(ApiError::BadRequest(
            "decision must be verified or rejected".to_string(),
        ));
    }

    let org = Organisation::find_by_id(OrganisationId::from_uuid(id), &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("organisation not found".to_string()))?;
    if org.verification_status != VerificationStatus::Pending.as_str() {
        return Err(ApiError::Conflict(
            "organisation has already been reviewed".to_string(),
        ));
    }

    let org = Organisation::set_verification_status(
        org.id,
        req.decision,
        req.remarks.as_deref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(org))
}

async fn pending_campaigns(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    auth.require_admin()?;
    let campaigns = Campaign::find_pending(&state.db_pool).await?;
    Ok(Json(campaigns))
}

/// Approve or reject a pending campaign. Rejection requires a reason.
async fn review_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CampaignReviewRequest>,
) -> Result<Json<Campaign>, ApiError> {
    auth.require_admin()?;
    match req.decision {
        CampaignStatus::Active => {}
        CampaignStatus::Rejected => {
            if req
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
            {
                return Err(ApiError::BadRequest(
                    "rejection reason is required".to_string(),
                ));
            }
        }
        _ => {
            return Err(ApiError::BadRequest(
                "decision must be active or rejected".to_string(),
            ))
        }
    }

    let campaign_id = CampaignId::from_uuid(id);
    let rejection_reason = match req.decision {
        CampaignStatus::Rejected => req.rejection_reason.as_deref(),
        _ => None,
    };

    match Campaign::review(
        campaign_id,
        req.decision,
        rejection_reason,
        req.remarks.as_deref(),
        &state.db_pool,
    )
    .await?
    {
        Some(campaign) => Ok(Json(campaign)),
        None => {
            if Campaign::find_by_id(campaign_id, &state.db_pool)
                .await?
                .is_some()
            {
                Err(ApiError::Conflict(
                    "campaign is not pending review".to_string(),
                ))
            } else {
                Err(ApiError::NotFound("campaign not found".to_string()))
            }
        }
    }
}

async fn list_users(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Query(args): Query<PaginationArgs>,
) -> Result<Json<Page<UserProfile>>, ApiError> {
    auth.require_admin()?;
    let args = args
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !args.is_forward() {
        return Err(ApiError::BadRequest(
            "backward pagination is not supported".to_string(),
        ));
    }

    let users = User::find_active_page(
        args.fetch_limit(),
        args.cursor.map(UserId::from_uuid),
        &state.db_pool,
    )
    .await?;

    let page = build_page(users, &args, |u: &User| u.id.into_uuid());
    Ok(Json(Page {
        items: page.items.iter().map(User::profile).collect(),
        page_info: page.page_info,
    }))
}
