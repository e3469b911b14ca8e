//! Tags domain - campaign labels for discovery and filtering.

pub mod models;
