//! Slug generation for campaign URLs.

use crate::common::CampaignId;

/// Slugify a title: lowercase, alphanumerics kept, runs of anything else
/// collapsed to single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress leading hyphen
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Build a unique campaign slug from its title and ID.
///
/// The ID suffix guarantees uniqueness without a retry loop on the
/// unique constraint.
pub fn campaign_slug(title: &str, id: CampaignId) -> String {
    let base = slugify(title);
    let suffix = &id.as_uuid().simple().to_string()[..8];
    if base.is_empty() {
        format!("campaign-{}", suffix)
    } else {
        format!("{}-{}", base, suffix)
    }
}
