use async_trait::async_trait;

use crate::app::ports::{AddressRequest, AddressVerification, AddressVerifier};
use crate::error::{Result, RosterError};

/// Verifier used when the service is switched off. Every call reports no answer,
/// so records keep empty V_* columns.
pub struct OfflineVerifier;

#[async_trait]
impl AddressVerifier for OfflineVerifier {
    async fn verify(&self, _request: &AddressRequest) -> Result<AddressVerification> {
        Err(RosterError::Verification {
            message: "address verification disabled".to_string(),
        })
    }

    fn name(&self) -> &str {
        "offline"
    }
}
