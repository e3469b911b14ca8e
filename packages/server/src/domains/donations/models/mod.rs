pub mod donation;

pub use donation::{
    is_valid_amount, Donation, DonationRecord, DonorSummary, MAX_AMOUNT, MIN_AMOUNT,
};
