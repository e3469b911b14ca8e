use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::{OrganisationId, Role, UserId};

/// User account - donors, organisation owners, and administrators.
///
/// Password material never leaves this struct; API responses use
/// [`UserProfile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String, // 'donor' | 'org_owner' | 'admin'
    pub profile_picture: Option<String>,
    pub organisation_id: Option<OrganisationId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public profile projection of a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub organisation_id: Option<OrganisationId>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Parsed role of this user.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Full name, falling back to the username when empty.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role.clone(),
            profile_picture: self.profile_picture.clone(),
            organisation_id: self.organisation_id,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// SQL Queries
// =============================================================================

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by username (login)
    pub async fn find_by_username(username: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Check whether a username is already taken
    pub async fn username_taken(username: &str, pool: &PgPool) -> Result<bool> {
        let exists: Option<(UserId,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(pool)
                .await?;
        Ok(exists.is_some())
    }

    /// Check whether an email is in use by any user other than `exclude`
    pub async fn email_taken(
        email: &str,
        exclude: Option<UserId>,
        pool: &PgPool,
    ) -> Result<bool> {
        let exists: Option<(UserId,)> = sqlx::query_as(
            "SELECT id FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(email)
        .bind(exclude)
        .fetch_optional(pool)
        .await?;
        Ok(exists.is_some())
    }

    /// Insert new user.
    ///
    /// Takes an executor so org-owner registration can run inside the
    /// same transaction that creates the organisation application.
    pub async fn insert<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, password_salt,
                first_name, last_name, role, profile_picture, organisation_id,
                is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.username)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(&self.password_salt)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.role)
        .bind(&self.profile_picture)
        .bind(self.organisation_id)
        .bind(self.is_active)
        .bind(self.created_at)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Update profile fields (name, email, profile picture)
    pub async fn update_profile(
        id: UserId,
        first_name: &str,
        last_name: &str,
        email: &str,
        profile_picture: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, profile_picture = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(profile_picture)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Newest-first page of active users (admin listing)
    pub async fn find_active_page(
        limit: i64,
        cursor: Option<UserId>,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users
            WHERE is_active = TRUE
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

    /// Find the owner account of an organisation, if any
    pub async fn find_owner_of_organisation(
        organisation_id: OrganisationId,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE organisation_id = $1 AND role = 'org_owner' LIMIT 1",
        )
        .bind(organisation_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }
}
