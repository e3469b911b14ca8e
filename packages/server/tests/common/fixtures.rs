//! Test fixtures for creating test data.
//!
//! Fixtures use the model methods directly, the same paths the handlers
//! take.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use server_core::common::{CampaignId, DonationId, OrganisationId, Role, UserId};
use server_core::domains::accounts::models::User;
use server_core::domains::accounts::password::{generate_salt, hash_password};
use server_core::domains::campaigns::models::{Campaign, CampaignStatus};
use server_core::domains::campaigns::slug::campaign_slug;
use server_core::domains::donations::models::Donation;
use server_core::domains::organizations::models::{Organisation, VerificationStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Unique suffix so fixtures never collide across tests sharing a database.
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_user(
    pool: &PgPool,
    role: Role,
    organisation_id: Option<OrganisationId>,
) -> Result<User> {
    let username = unique("user");
    let salt = generate_salt();
    let user = User {
        id: UserId::new(),
        username: username.clone(),
        email: format!("{}@example.com", username),
        password_hash: hash_password("hunter2hunter2", &salt),
        password_salt: salt,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role: role.as_str().to_string(),
        profile_picture: None,
        organisation_id,
        is_active: true,
        created_at: Utc::now(),
    };
    user.insert(pool).await
}

pub async fn create_donor(pool: &PgPool) -> Result<User> {
    create_user(pool, Role::Donor, None).await
}

pub async fn create_admin(pool: &PgPool) -> Result<User> {
    create_user(pool, Role::Admin, None).await
}

pub async fn create_organisation(
    pool: &PgPool,
    status: VerificationStatus,
) -> Result<Organisation> {
    let org = Organisation {
        id: OrganisationId::new(),
        name: unique("org"),
        website: None,
        mission: Some("Testing mission".to_string()),
        contact_phone: None,
        application_notes: None,
        admin_remarks: None,
        logo: None,
        banner: None,
        verification_status: status.as_str().to_string(),
        verified: status == VerificationStatus::Verified,
        is_active: true,
        created_at: Utc::now(),
    };
    org.insert(pool).await
}

/// A verified organisation plus its owner account.
pub async fn create_org_with_owner(pool: &PgPool) -> Result<(Organisation, User)> {
    let org = create_organisation(pool, VerificationStatus::Verified).await?;
    let owner = create_user(pool, Role::OrgOwner, Some(org.id)).await?;
    Ok((org, owner))
}

pub async fn create_campaign(
    pool: &PgPool,
    organisation_id: OrganisationId,
    status: CampaignStatus,
) -> Result<Campaign> {
    let id = CampaignId::new();
    let title = unique("campaign");
    let campaign = Campaign {
        id,
        title: title.clone(),
        slug: campaign_slug(&title, id),
        description: "Fixture campaign".to_string(),
        funding_goal: Decimal::new(100_000, 2), // $1,000.00
        category: "community".to_string(),
        cover_image: None,
        organisation_id,
        created_by: None,
        status: status.as_str().to_string(),
        rejection_reason: None,
        admin_remarks: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        closed_at: None,
    };
    campaign.insert(pool).await
}

pub async fn create_donation(
    pool: &PgPool,
    campaign_id: CampaignId,
    donor_id: UserId,
    amount: i64,
) -> Result<Donation> {
    let id = DonationId::new();
    // Suffix from the donation id, not the donor: several fixture donations
    // by one donor in the same second must not collide.
    let reference = format!(
        "DON-{}-{}",
        Utc::now().timestamp(),
        &id.as_uuid().simple().to_string()[..8]
    );
    let donation = Donation {
        id,
        campaign_id,
        donor_id,
        amount,
        reference_number: reference,
        comment: None,
        created_at: Utc::now(),
    };
    donation.insert(pool).await
}
