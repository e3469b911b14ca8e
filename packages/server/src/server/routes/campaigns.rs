//! Campaign browsing and the owner-side status workflow.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{
    build_page, CampaignId, OrganisationId, Page, PaginationArgs, Role,
};
use crate::domains::campaigns::models::{is_valid_category, Campaign, CampaignStatus};
use crate::domains::campaigns::slug::campaign_slug;
use crate::domains::donations::models::{Donation, DonationRecord};
use crate::domains::tags::models::Tag;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::{AuthUser, CurrentUser, MaybeUser};
use crate::server::routes::ensure_max_chars;

// Matches the title column width; the slug adds a short id suffix and
// still fits its own column.
const MAX_TITLE_LENGTH: usize = 100;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/mine", get(my_campaigns))
        .route(
            "/:id",
            get(campaign_detail)
                .put(update_campaign)
                .delete(delete_campaign),
        )
        .route("/:id/close", post(close_campaign))
        .route("/:id/reactivate", post(reactivate_campaign))
        .route("/:id/donations", get(campaign_donations))
}

/// Public view of a campaign: review fields stripped.
#[derive(Serialize)]
pub struct CampaignView {
    pub id: CampaignId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub funding_goal: Decimal,
    pub category: String,
    pub cover_image: Option<String>,
    pub organisation_id: OrganisationId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<Campaign> for CampaignView {
    fn from(c: Campaign) -> Self {
        CampaignView {
            id: c.id,
            title: c.title,
            slug: c.slug,
            description: c.description,
            funding_goal: c.funding_goal,
            category: c.category,
            cover_image: c.cover_image,
            organisation_id: c.organisation_id,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
            closed_at: c.closed_at,
        }
    }
}

/// Detail view: public fields plus donation aggregates and tags. Review
/// fields are present only for the owning organisation and admins.
#[derive(Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: CampaignView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_remarks: Option<String>,
    pub total_raised: i64,
    pub donor_count: i64,
    pub progress_percent: i32,
    pub days_active: i64,
    pub tags: Vec<Tag>,
}

#[derive(Deserialize)]
pub struct CampaignListQuery {
    pub first: Option<i32>,
    pub after: Option<String>,
    pub last: Option<i32>,
    pub before: Option<String>,
    pub category: Option<String>,
    pub organisation: Option<Uuid>,
    pub tag: Option<String>,
}

#[derive(Deserialize)]
pub struct CampaignWriteRequest {
    pub title: String,
    pub description: String,
    pub funding_goal: Decimal,
    pub category: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct RecentDonationsQuery {
    pub limit: Option<i64>,
}

fn validate_write(req: &CampaignWriteRequest) -> Result<(), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    ensure_max_chars("title", req.title.trim(), MAX_TITLE_LENGTH)?;
    if req.funding_goal <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "funding goal must be positive".to_string(),
        ));
    }
    if !is_valid_category(&req.category) {
        return Err(ApiError::BadRequest(format!(
            "unknown category: {}",
            req.category
        )));
    }
    Ok(())
}

fn pagination_from(q: &CampaignListQuery) -> PaginationArgs {
    PaginationArgs {
        first: q.first,
        after: q.after.clone(),
        last: q.last,
        before: q.before.clone(),
    }
}

async fn list_campaigns(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<CampaignListQuery>,
) -> Result<Json<Page<CampaignView>>, ApiError> {
    let args = pagination_from(&query)
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if !args.is_forward() {
        return Err(ApiError::BadRequest(
            "backward pagination is not supported".to_string(),
        ));
    }

    let campaigns = Campaign::find_active_page(
        args.fetch_limit(),
        args.cursor.map(CampaignId::from_uuid),
        query.category.as_deref(),
        query.organisation.map(OrganisationId::from_uuid),
        query.tag.as_deref(),
        &state.db_pool,
    )
    .await?;

    let page = build_page(campaigns, &args, |c: &Campaign| c.id.into_uuid());
    Ok(Json(Page {
        items: page.items.into_iter().map(CampaignView::from).collect(),
        page_info: page.page_info,
    }))
}

/// All campaigns of the caller's organisation, any status.
async fn my_campaigns(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let campaigns = Campaign::find_by_organisation(org.id, &state.db_pool).await?;
    Ok(Json(campaigns))
}

async fn create_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Json(req): Json<CampaignWriteRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    validate_write(&req)?;

    let id = CampaignId::new();
    let campaign = Campaign {
        id,
        title: req.title.trim().to_string(),
        slug: campaign_slug(req.title.trim(), id),
        description: req.description,
        funding_goal: req.funding_goal,
        category: req.category,
        cover_image: req.cover_image,
        organisation_id: org.id,
        created_by: Some(auth.user_id),
        status: CampaignStatus::Pending.as_str().to_string(),
        rejection_reason: None,
        admin_remarks: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        closed_at: None,
    };
    let campaign = campaign.insert(&state.db_pool).await?;

    if let Some(names) = &req.tags {
        Tag::set_campaign_tags(campaign.id, names, &state.db_pool).await?;
    }

    Ok((StatusCode::CREATED, Json(campaign)))
}

/// Campaign detail by ID or slug.
///
/// Visibility: the public sees only active campaigns; owners additionally
/// see every campaign of their own organisation; admins see all.
async fn campaign_detail(
    Extension(state): Extension<AxumAppState>,
    MaybeUser(auth): MaybeUser,
    Path(id_or_slug): Path<String>,
) -> Result<Json<CampaignDetail>, ApiError> {
    let campaign = match Uuid::parse_str(&id_or_slug) {
        Ok(uuid) => Campaign::find_by_id(CampaignId::from_uuid(uuid), &state.db_pool).await?,
        Err(_) => Campaign::find_by_slug(&id_or_slug, &state.db_pool).await?,
    }
    .ok_or_else(|| ApiError::NotFound("campaign not found".to_string()))?;

    let privileged = is_privileged(auth.as_ref(), &campaign);
    if !campaign.is_active() && !privileged {
        return Err(ApiError::NotFound("campaign not found".to_string()));
    }

    let stats = Campaign::stats(campaign.id, &state.db_pool).await?;
    let tags = Tag::find_by_campaign(campaign.id, &state.db_pool).await?;

    let rejection_reason = privileged.then(|| campaign.rejection_reason.clone()).flatten();
    let admin_remarks = privileged.then(|| campaign.admin_remarks.clone()).flatten();
    let progress_percent = campaign.progress_percent(stats.total_raised);
    let days_active = campaign.days_active(Utc::now());

    Ok(Json(CampaignDetail {
        campaign: CampaignView::from(campaign),
        rejection_reason,
        admin_remarks,
        total_raised: stats.total_raised,
        donor_count: stats.donor_count,
        progress_percent,
        days_active,
        tags,
    }))
}

fn is_privileged(auth: Option<&AuthUser>, campaign: &Campaign) -> bool {
    match auth {
        Some(user) if user.role == Role::Admin => true,
        Some(user) if user.role == Role::OrgOwner => {
            user.organisation_id == Some(campaign.organisation_id)
        }
        _ => false,
    }
}

/// Owner edit. Resubmitting a rejected campaign returns it to pending.
async fn update_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CampaignWriteRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    validate_write(&req)?;

    let campaign = find_owned(CampaignId::from_uuid(id), org.id, &state).await?;
    let current = campaign
        .status()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unknown status: {}", campaign.status)))?;
    let next_status = if current == CampaignStatus::Rejected {
        CampaignStatus::Pending
    } else {
        current
    };

    let campaign = Campaign::update_content(
        campaign.id,
        req.title.trim(),
        &req.description,
        req.funding_goal,
        &req.category,
        req.cover_image.as_deref(),
        next_status,
        &state.db_pool,
    )
    .await?;

    if let Some(names) = &req.tags {
        Tag::set_campaign_tags(campaign.id, names, &state.db_pool).await?;
    }

    Ok(Json(campaign))
}

async fn close_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let campaign = find_owned(CampaignId::from_uuid(id), org.id, &state).await?;

    Campaign::close(campaign.id, org.id, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Conflict("only active campaigns can be closed".to_string()))
}

async fn reactivate_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let campaign = find_owned(CampaignId::from_uuid(id), org.id, &state).await?;

    Campaign::reactivate(campaign.id, org.id, &state.db_pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Conflict("only closed campaigns can be reactivated".to_string()))
}

async fn delete_campaign(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let org = auth.require_organisation(&state.db_pool).await?;
    let campaign = find_owned(CampaignId::from_uuid(id), org.id, &state).await?;

    if Campaign::delete_draft(campaign.id, org.id, &state.db_pool).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::Conflict(
            "only draft campaigns can be deleted".to_string(),
        ))
    }
}

/// Recent donations to a campaign. Follows the same visibility rule as
/// the campaign detail.
async fn campaign_donations(
    Extension(state): Extension<AxumAppState>,
    MaybeUser(auth): MaybeUser,
    Path(id): Path<Uuid>,
    Query(query): Query<RecentDonationsQuery>,
) -> Result<Json<Vec<DonationRecord>>, ApiError> {
    let campaign = Campaign::find_by_id(CampaignId::from_uuid(id), &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("campaign not found".to_string()))?;
    if !campaign.is_active() && !is_privileged(auth.as_ref(), &campaign) {
        return Err(ApiError::NotFound("campaign not found".to_string()));
    }

    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let donations = Donation::find_recent_by_campaign(campaign.id, limit, &state.db_pool).await?;
    Ok(Json(donations))
}

async fn find_owned(
    id: CampaignId,
    organisation_id: OrganisationId,
    state: &AxumAppState,
) -> Result<Campaign, ApiError> {
    let campaign = Campaign::find_by_id(id, &state.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("campaign not found".to_string()))?;
    if campaign.organisation_id != organisation_id {
        return Err(ApiError::Forbidden(
            "campaign belongs to another organisation".to_string(),
        ));
    }
    Ok(campaign)
}
