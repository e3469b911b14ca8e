//! Authentication and authorization primitives shared across domains.

pub mod errors;
pub mod role;

pub use errors::AuthError;
pub use role::Role;
