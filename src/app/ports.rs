use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PostalAddress;

/// What the address verification service is asked. No state: the service infers it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRequest {
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub zip5: String,
}

impl AddressRequest {
    pub fn from_address(address: &PostalAddress) -> Self {
        Self {
            address1: address.address1.clone(),
            address2: address.address2.clone(),
            city: address.city.clone(),
            zip5: address.zip.chars().take(5).collect(),
        }
    }
}

/// Corrected components returned by the service. Missing fields are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressVerification {
    pub street: String,
    pub secondary: String,
    pub city: String,
    pub state: String,
    pub zip5: String,
    pub zip4: String,
    /// Set when the service answered but rejected the address
    pub error: Option<String>,
}

/// External address verification collaborator.
///
/// An `Err` means no answer was obtained (transport, HTTP status, unreadable body);
/// a rejected address is an `Ok` carrying `error`.
#[async_trait]
pub trait AddressVerifier: Send + Sync {
    async fn verify(&self, request: &AddressRequest) -> Result<AddressVerification>;

    fn name(&self) -> &str;
}
