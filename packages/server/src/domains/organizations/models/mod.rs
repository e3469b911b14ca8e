pub mod organisation;

pub use organisation::{Organisation, OrganisationStats, PublicOrganisation, VerificationStatus};
