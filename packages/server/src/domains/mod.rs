//! Business domains. Each domain owns its models, and models own their SQL.

pub mod accounts;
pub mod campaigns;
pub mod donations;
pub mod organizations;
pub mod tags;
