//! Organisations domain - applications, verification, and owner settings.

pub mod models;
