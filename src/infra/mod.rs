pub mod offline_verifier;
pub mod usps_verifier;

pub use offline_verifier::OfflineVerifier;
pub use usps_verifier::UspsVerifier;
