//! Accounts domain - users, credentials, and token issuance.
//!
//! Responsibilities:
//! - Donor and organisation-owner registration
//! - Login with salted password digests
//! - JWT token management

pub mod jwt;
pub mod models;
pub mod password;

pub use jwt::{Claims, JwtService};
