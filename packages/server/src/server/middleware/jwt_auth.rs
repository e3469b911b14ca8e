use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, middleware::Next, response::Response};
use sqlx::PgPool;
use tracing::debug;

use crate::common::{AuthError, OrganisationId, Role, UserId};
use crate::domains::accounts::JwtService;
use crate::domains::organizations::models::Organisation;
use crate::server::error::ApiError;

/// Authenticated user information from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub organisation_id: Option<OrganisationId>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired.into())
        }
    }

    pub fn require_donor(&self) -> Result<(), ApiError> {
        if self.role == Role::Donor {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied("donor account required".to_string()).into())
        }
    }

    /// Resolve the caller's organisation, enforcing the org-owner guard:
    /// role is `org_owner`, an organisation is attached, and it is active.
    pub async fn require_organisation(&self, pool: &PgPool) -> Result<Organisation, ApiError> {
        if self.role != Role::OrgOwner {
            return Err(AuthError::PermissionDenied(
                "organisation owner account required".to_string(),
            )
            .into());
        }
        let org_id = self.organisation_id.ok_or_else(|| {
            AuthError::PermissionDenied("no organisation attached to this account".to_string())
        })?;
        let org = Organisation::find_by_id(org_id, pool).await?.ok_or_else(|| {
            AuthError::PermissionDenied("organisation no longer exists".to_string())
        })?;
        if !org.is_active {
            return Err(
                AuthError::PermissionDenied("organisation is deactivated".to_string()).into(),
            );
        }
        Ok(org)
    }
}

/// Extractor for endpoints that require a logged-in caller. Rejects with
/// 401 when the middleware found no valid token.
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extractor for public endpoints whose response is scoped by the caller's
/// identity when one is present.
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthUser>().cloned()))
    }
}

/// JWT authentication middleware
///
/// Extracts JWT token from Authorization header, verifies it, and adds AuthUser to request extensions.
/// If no token or invalid token, request continues without AuthUser (public access).
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(
            "Authenticated user: {} (role: {})",
            user.username, user.role
        );
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Handle both "Bearer <token>" and raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: UserId::from_uuid(claims.user_id),
        username: claims.username,
        role: claims.role,
        organisation_id: claims.organisation_id.map(OrganisationId::from_uuid),
    })
}
