//! Campaigns domain - fundraising initiatives and their status workflow.

pub mod models;
pub mod slug;
