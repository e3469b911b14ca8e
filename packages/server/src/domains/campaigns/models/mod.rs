pub mod campaign;

pub use campaign::{is_valid_category, Campaign, CampaignStats, CampaignStatus, CATEGORIES};
