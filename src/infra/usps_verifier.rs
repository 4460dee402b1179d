use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{AddressRequest, AddressVerification, AddressVerifier};
use crate::config::VerifierConfig;
use crate::error::{Result, RosterError};

/// USPS Web Tools `Verify` client.
///
/// USPS puts the street in `Address2` and the apartment/suite in `Address1`,
/// so the request's lines are swapped into place here.
pub struct UspsVerifier {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl UspsVerifier {
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        if config.user_id.trim().is_empty() {
            return Err(RosterError::Config(
                "verifier.user_id (or USPS_USER_ID) is required for address verification".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            user_id: config.user_id.clone(),
        })
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the `AddressValidateRequest` document sent in the `XML` query parameter
pub fn build_request_xml(user_id: &str, request: &AddressRequest) -> String {
    format!(
        "<AddressValidateRequest USERID=\"{}\"><Address ID=\"0\">\
         <Address1>{}</Address1><Address2>{}</Address2><City>{}</City>\
         <State></State><Zip5>{}</Zip5><Zip4></Zip4></Address></AddressValidateRequest>",
        escape_xml(user_id),
        escape_xml(&request.address2),
        escape_xml(&request.address1),
        escape_xml(&request.city),
        escape_xml(&request.zip5),
    )
}

/// Parse an `AddressValidateResponse`. Any `Error` element, nested or top-level,
/// marks the address as rejected.
pub fn parse_response(body: &str) -> Result<AddressVerification> {
    let doc = roxmltree::Document::parse(body).map_err(|e| RosterError::Verification {
        message: format!("unreadable response: {}", e),
    })?;

    let text = |tag: &str| -> String {
        doc.descendants()
            .find(|n| n.has_tag_name(tag))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    };

    let error = doc.descendants().find(|n| n.has_tag_name("Error")).map(|node| {
        node.descendants()
            .find(|n| n.has_tag_name("Description"))
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| "address rejected".to_string())
    });

    Ok(AddressVerification {
        street: text("Address2"),
        secondary: text("Address1"),
        city: text("City"),
        state: text("State"),
        zip5: text("Zip5"),
        zip4: text("Zip4"),
        error,
    })
}

#[async_trait]
impl AddressVerifier for UspsVerifier {
    async fn verify(&self, request: &AddressRequest) -> Result<AddressVerification> {
        let xml = build_request_xml(&self.user_id, request);
        let body = self
            .client
            .get(&self.base_url)
            .query(&[("API", "Verify"), ("XML", xml.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(bytes = body.len(), "USPS response received");
        parse_response(&body)
    }

    fn name(&self) -> &str {
        "usps"
    }
}
