//! Registration, login, and profile endpoints.

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::common::{AuthError, OrganisationId, Role, UserId};
use crate::domains::accounts::models::{User, UserProfile};
use crate::domains::accounts::password::{generate_salt, hash_password, verify_password};
use crate::domains::organizations::models::{Organisation, VerificationStatus};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::middleware::CurrentUser;
use crate::server::routes::ensure_max_chars;

pub fn router() -> Router {
    Router::new()
        .route("/register/donor", post(register_donor))
        .route("/register/org", post(register_org))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
}

// Upper bounds match the column widths in the schema.
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_USERNAME_LENGTH: usize = 150;
const MAX_EMAIL_LENGTH: usize = 254;
const MAX_NAME_LENGTH: usize = 150;
const MAX_ORG_NAME_LENGTH: usize = 120;
const MAX_WEBSITE_LENGTH: usize = 200;
const MAX_PHONE_LENGTH: usize = 20;

#[derive(Deserialize)]
pub struct RegisterDonorRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct RegisterOrgRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub organisation_name: String,
    pub website: Option<String>,
    pub mission: Option<String>,
    pub contact_phone: Option<String>,
    pub application_notes: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub profile_picture: Option<String>,
}

fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::BadRequest("username is required".to_string()));
    }
    ensure_max_chars("username", username.trim(), MAX_USERNAME_LENGTH)?;
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_identity_fields(email: &str, first_name: &str, last_name: &str) -> Result<(), ApiError> {
    ensure_max_chars("email", email.trim(), MAX_EMAIL_LENGTH)?;
    ensure_max_chars("first_name", first_name, MAX_NAME_LENGTH)?;
    ensure_max_chars("last_name", last_name, MAX_NAME_LENGTH)?;
    Ok(())
}

async fn check_identity_available(
    username: &str,
    email: &str,
    state: &AxumAppState,
) -> Result<(), ApiError> {
    if User::username_taken(username, &state.db_pool).await? {
        return Err(ApiError::Conflict("username already taken".to_string()));
    }
    if User::email_taken(email, None, &state.db_pool).await? {
        return Err(ApiError::Conflict("email already in use".to_string()));
    }
    Ok(())
}

async fn register_donor(
    Extension(state): Extension<AxumAppState>,
    Json(req): Json<RegisterDonorRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_credentials(&req.username, &req.password)?;
    validate_identity_fields(&req.email, &req.first_name, &req.last_name)?;
    check_identity_available(req.username.trim(), req.email.trim(), &state).await?;

    let salt = generate_salt();
    let user = User {
        id: UserId::new(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash: hash_password(&req.password, &salt),
        password_salt: salt,
        first_name: req.first_name,
        last_name: req.last_name,
        role: Role::Donor.as_str().to_string(),
        profile_picture: None,
        organisation_id: None,
        is_active: true,
        created_at: Utc::now(),
    };
    let user = user.insert(&state.db_pool).await?;

    let token = state.jwt_service.create_token(
        user.id.into_uuid(),
        user.username.clone(),
        Role::Donor,
        None,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

/// Register an organisation owner. Creates the owner account and the
/// organisation application atomically; the organisation starts in
/// `pending` and is invisible to the public until verified.
async fn register_org(
    Extension(state): Extension<AxumAppState>,
    Json(req): Json<RegisterOrgRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_credentials(&req.username, &req.password)?;
    validate_identity_fields(&req.email, &req.first_name, &req.last_name)?;
    if req.organisation_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "organisation name is required".to_string(),
        ));
    }
    ensure_max_chars(
        "organisation_name",
        req.organisation_name.trim(),
        MAX_ORG_NAME_LENGTH,
    )?;
    if let Some(website) = &req.website {
        ensure_max_chars("website", website, MAX_WEBSITE_LENGTH)?;
    }
    if let Some(phone) = &req.contact_phone {
        ensure_max_chars("contact_phone", phone, MAX_PHONE_LENGTH)?;
    }
    check_identity_available(req.username.trim(), req.email.trim(), &state).await?;
    if Organisation::find_by_name(req.organisation_name.trim(), &state.db_pool)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "organisation name already taken".to_string(),
        ));
    }

    let mut tx = state.db_pool.begin().await.map_err(anyhow::Error::from)?;

    let organisation = Organisation {
        id: OrganisationId::new(),
        name: req.organisation_name.trim().to_string(),
        website: req.website,
        mission: req.mission,
        contact_phone: req.contact_phone,
        application_notes: req.application_notes,
        admin_remarks: None,
        logo: None,
        banner: None,
        verification_status: VerificationStatus::Pending.as_str().to_string(),
        verified: false,
        is_active: true,
        created_at: Utc::now(),
    };
    let organisation = organisation.insert(&mut *tx).await?;

    let salt = generate_salt();
    let user = User {
        id: UserId::new(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash: hash_password(&req.password, &salt),
        password_salt: salt,
        first_name: req.first_name,
        last_name: req.last_name,
        role: Role::OrgOwner.as_str().to_string(),
        profile_picture: None,
        organisation_id: Some(organisation.id),
        is_active: true,
        created_at: Utc::now(),
    };
    let user = user.insert(&mut *tx).await?;

    tx.commit().await.map_err(anyhow::Error::from)?;

    let token = state.jwt_service.create_token(
        user.id.into_uuid(),
        user.username.clone(),
        Role::OrgOwner,
        Some(organisation.id.into_uuid()),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.profile(),
        }),
    ))
}

async fn login(
    Extension(state): Extension<AxumAppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User::find_by_username(&req.username, &state.db_pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_salt, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }
    if !user.is_active {
        return Err(ApiError::Forbidden("account is deactivated".to_string()));
    }

    let role = user
        .role()
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("unknown role: {}", user.role)))?;

    let token = state.jwt_service.create_token(
        user.id.into_uuid(),
        user.username.clone(),
        role,
        user.organisation_id.map(|id| id.into_uuid()),
    )?;

    Ok(Json(AuthResponse {
        token,
        user: user.profile(),
    }))
}

async fn me(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let user = User::find_by_id(auth.user_id, &state.db_pool)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(user.profile()))
}

async fn update_me(
    Extension(state): Extension<AxumAppState>,
    CurrentUser(auth): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    validate_identity_fields(&req.email, &req.first_name, &req.last_name)?;
    if User::email_taken(req.email.trim(), Some(auth.user_id), &state.db_pool).await? {
        return Err(ApiError::Conflict("email already in use".to_string()));
    }

    let user = User::update_profile(
        auth.user_id,
        &req.first_name,
        &req.last_name,
        req.email.trim(),
        req.profile_picture.as_deref(),
        &state.db_pool,
    )
    .await?;
    Ok(Json(user.profile()))
}
