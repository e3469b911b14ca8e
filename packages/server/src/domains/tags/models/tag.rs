use anyhow::Result;
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};

use crate::common::{CampaignId, TagId};
use crate::domains::campaigns::slug::slugify;

/// Tag - free-form label attached to campaigns for discovery.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl Tag {
    /// Build a new tag, deriving its slug from the name.
    pub fn new(name: &str, description: Option<String>) -> Self {
        Tag {
            id: TagId::new(),
            name: name.to_string(),
            slug: slugify(name),
            description,
        }
    }

    /// Find tag by slug
    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tags WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// All tags, alphabetical
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM tags ORDER BY name")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Tags attached to a campaign, alphabetical
    pub async fn find_by_campaign(campaign_id: CampaignId, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT t.* FROM tags t
            JOIN campaign_tags ct ON ct.tag_id = t.id
            WHERE ct.campaign_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a tag, returning the existing row if the slug is taken
    pub async fn insert_or_get<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO tags (id, name, slug, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
            RETURNING *
            "#,
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.slug)
        .bind(&self.description)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Replace a campaign's tag set with the given tag names.
    ///
    /// Missing tags are created on the fly. Names that slugify to nothing
    /// are dropped.
    pub async fn set_campaign_tags(
        campaign_id: CampaignId,
        names: &[String],
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM campaign_tags WHERE campaign_id = $1")
            .bind(campaign_id)
            .execute(&mut *tx)
            .await?;

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if slugify(name).is_empty() {
                continue;
            }
            let tag = Tag::new(name, None).insert_or_get(&mut *tx).await?;
            sqlx::query(
                r#"
                INSERT INTO campaign_tags (campaign_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(campaign_id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;
            tags.push(tag);
        }

        tx.commit().await?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags.dedup_by(|a, b| a.slug == b.slug);
        Ok(tags)
    }
}
