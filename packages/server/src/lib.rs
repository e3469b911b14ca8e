// Crowdfunding platform - API core
//
// Backend API for a multi-tenant crowdfunding service: donors browse and
// fund campaigns, organisation owners run them, administrators review
// organisation applications and campaign submissions.
//
// Domains own their models, and models own their SQL.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
