//! Development seeding CLI.
//!
//! Creates an admin account, a verified organisation with its owner, and a
//! pending organisation application, plus the default tag set. Safe to run
//! repeatedly: existing usernames are skipped.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use server_core::common::{OrganisationId, Role, UserId};
use server_core::config::Config;
use server_core::domains::accounts::models::User;
use server_core::domains::accounts::password::{generate_salt, hash_password};
use server_core::domains::campaigns::models::{Campaign, CampaignStatus};
use server_core::domains::campaigns::slug::campaign_slug;
use server_core::domains::organizations::models::{Organisation, VerificationStatus};
use server_core::domains::tags::models::Tag;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Seed development data: admin, organisations, tags")]
struct Cli {
    /// Password assigned to every seeded account
    #[arg(long, default_value = "changeme123")]
    password: String,

    /// Also create a sample active campaign for the verified organisation
    #[arg(long)]
    with_campaign: bool,
}

const DEFAULT_TAGS: &[&str] = &[
    "urgent",
    "children",
    "local",
    "international",
    "recurring-need",
];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    println!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    seed_user(&pool, "admin", "admin@example.com", Role::Admin, None, &cli.password).await?;

    let verified_org = seed_organisation(
        &pool,
        "Helping Hands Foundation",
        Some("Food and shelter for families in crisis"),
        VerificationStatus::Verified,
    )
    .await?;
    seed_user(
        &pool,
        "helpinghands",
        "owner@helpinghands.example.com",
        Role::OrgOwner,
        Some(verified_org.id),
        &cli.password,
    )
    .await?;

    let pending_org = seed_organisation(
        &pool,
        "River Cleanup Collective",
        Some("Volunteer-driven waterway restoration"),
        VerificationStatus::Pending,
    )
    .await?;
    seed_user(
        &pool,
        "rivercleanup",
        "owner@rivercleanup.example.com",
        Role::OrgOwner,
        Some(pending_org.id),
        &cli.password,
    )
    .await?;

    for name in DEFAULT_TAGS {
        let tag = Tag::new(name, None).insert_or_get(&pool).await?;
        println!("Tag ready: {}", tag.slug);
    }

    if cli.with_campaign {
        seed_campaign(&pool, &verified_org).await?;
    }

    println!("\nSeeding complete");
    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    role: Role,
    organisation_id: Option<OrganisationId>,
    password: &str,
) -> Result<()> {
    if User::username_taken(username, pool).await? {
        println!("User exists, skipping: {}", username);
        return Ok(());
    }

    let salt = generate_salt();
    let user = User {
        id: UserId::new(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password, &salt),
        password_salt: salt,
        first_name: String::new(),
        last_name: String::new(),
        role: role.as_str().to_string(),
        profile_picture: None,
        organisation_id,
        is_active: true,
        created_at: Utc::now(),
    };
    user.insert(pool).await?;
    println!("Created {} user: {}", role, username);
    Ok(())
}

async fn seed_organisation(
    pool: &PgPool,
    name: &str,
    mission: Option<&str>,
    status: VerificationStatus,
) -> Result<Organisation> {
    if let Some(existing) = Organisation::find_by_name(name, pool).await? {
        println!("Organisation exists, skipping: {}", name);
        return Ok(existing);
    }

    let org = Organisation {
        id: OrganisationId::new(),
        name: name.to_string(),
        website: None,
        mission: mission.map(String::from),
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
    let org = org.insert(pool).await?;
    println!("Created organisation ({}): {}", status.as_str(), name);
    Ok(org)
}

async fn seed_campaign(pool: &PgPool, org: &Organisation) -> Result<()> {
    let title = "Winter Meal Drive";
    if Campaign::find_by_organisation(org.id, pool)
        .await?
        .iter()
        .any(|c| c.title == title)
    {
        println!("Campaign exists, skipping: {}", title);
        return Ok(());
    }

    let id = server_core::common::CampaignId::new();
    let campaign = Campaign {
        id,
        title: title.to_string(),
        slug: campaign_slug(title, id),
        description: "Hot meals for 500 families through the winter months.".to_string(),
        funding_goal: rust_decimal::Decimal::new(2_500_000, 2),
        category: "poverty".to_string(),
        cover_image: None,
        organisation_id: org.id,
        created_by: None,
        status: CampaignStatus::Active.as_str().to_string(),
        rejection_reason: None,
        admin_remarks: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        closed_at: None,
    };
    campaign.insert(pool).await?;
    println!("Created active campaign: {}", title);
    Ok(())
}
