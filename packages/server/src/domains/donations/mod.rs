//! Donations domain - contributions, reference numbers, and export.

pub mod export;
pub mod models;
pub mod reference;
