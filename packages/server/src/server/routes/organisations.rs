//! Public organisation browsing and owner-side management.

use axum::{
    extract::{Extension, Path, Query},
    http::header,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{build_page, DonationId, OrganisationId, Page, PaginationArgs};
use crate::domains::campaigns::models::Campaign;
use crate::domains::donations::export::donations_csv;
use crate::domains::donations::models::{Donation, DonationRecord};
use crate::domains::organizations::models::{Organisation, OrganisationStats, PublicOrganisation};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::ensure_max_chars;

// Column widths from the schema.
const MAX_WEBSITE_LENGTH: usize = 200;
const MAX_PHONE_LENGTH: usize = 20;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_organisations))
        .route("/dashboard", get(dashboard))
        .route("/settings", put(update_settings))
        .route("/donations", get(list_donations))
        .route("/donations/export", get(export_donations))
        .route("/:id", get(organisation_detail))
        .route("/:id/campaigns", get(organisation_campaigns))
}

#[derive(Serialize)]
pub struct OrganisationDetailResponse {
    pub organisation: PublicOrganisation,
    pub stats: OrganisationStats,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub organisation: Organisation,
    pub stats: OrganisationStats,
    pub recent_donations: Vec<DonationRecord>,
}

#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub website: Option<String>,
    pub mission: Option<String>,
    pub contact_phone: Option<String>,
    pub logo: Option<String>,
    pub banner: Option<String>,
}

#[derive(Deserialize)]
pub struct OrgDonationsQuery {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
    pub campaign: Option<Uuid>,
}

async fn list_organisations(
    Extension(state): Extension<AxumAppState>,
    Query(args): Query<PaginationArgs>,
) -> Result<Json<Page<PublicOrganisation>>, ApiError> {
    let args = args
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !args.is_forward() {
        return Err(ApiError::BadRequest(
            "backward pagination is not supported".to_string(),
        ));
    }

    let orgs = Organisation::find_public_page(
        args.fetch_limit(),
        args.cursor.map(OrganisationId::from_uuid),
        &state.db_pool,
    )
    .await?;

    let page = build_page(orgs, &args, |o: &Organisation| o.id.into_uuid());
    Ok(Json(Page {
        items: page
            .items
            .into_iter()
            .map(PublicOrganisation::from)
            .collect(),
        page_info: page.page_info,
    }))
}

async fn organisation_detail(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrganisationDetailResponse>, ApiError> {
    let org = Organisation::find_public(OrganisationId::from_uuid(id), &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("organisation not found".to_string()))?;
    let stats = Organisation::stats(org.id, &state.db_pool).await?;

    Ok(Json(OrganisationDetailResponse {
        organisation: org.into(),
        stats,
    }))
}

async fn organisation_campaigns(
    Extension(state): Extension<AxumAppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let org = Organisation::find_public(OrganisationId::from_uuid(id), &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("organisation not found".to_string()))?;
    let campaigns = Campaign::find_active_by_organisation(org.id, 50, &state.db_pool).await?;
    Ok(Json(campaigns))
}

/// Owner dashboard: full organisation record, aggregates, and the five
/// most recent donations.
async fn dashboard(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let stats = Organisation::stats(org.id, &state.db_pool).await?;
    let recent_donations =
        Donation::find_by_organisation_page(org.id, None, 5, None, &state.db_pool).await?;

    Ok(Json(DashboardResponse {
        organisation: org,
        stats,
        recent_donations,
    }))
}

async fn update_settings(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<Organisation>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    if let Some(website) = &req.website {
        ensure_max_chars("website", website, MAX_WEBSITE_LENGTH)?;
    }
    if let Some(phone) = &req.contact_phone {
        ensure_max_chars("contact_phone", phone, MAX_PHONE_LENGTH)?;
    }
    let org = Organisation::update_settings(
        org.id,
        req.website.as_deref(),
        req.mission.as_deref(),
        req.contact_phone.as_deref(),
        req.logo.as_deref(),
        req.banner.as_deref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(org))
}

async fn list_donations(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Query(query): Query<OrgDonationsQuery>,
) -> Result<Json<Page<DonationRecord>>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let args = PaginationArgs {
        first: query.first,
        after: query.after,
        last: query.last,
        before: query.before,
    }
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !args.is_forward() {
        return Err(ApiError::BadRequest(
            "backward pagination is not supported".to_string(),
        ));
    }

    let donations = Donation::find_by_organisation_page(
        org.id,
        query.campaign.map(crate::common::CampaignId::from_uuid),
        args.fetch_limit(),
        args.cursor.map(DonationId::from_uuid),
        &state.db_pool,
    )
    .await?;

    Ok(Json(build_page(donations, &args, |d: &DonationRecord| {
        d.id.into_uuid()
    })))
}

/// Full donation history as a CSV attachment.
async fn export_donations(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let donations = Donation::find_all_by_organisation(org.id, &state.db_pool).await?;
    let csv = donations_csv(&donations);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"donations.csv\"",
            ),
        ],
        csv,
    ))
}
