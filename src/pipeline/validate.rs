use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};

use crate::app::ports::{AddressRequest, AddressVerification, AddressVerifier};
use crate::constants::VALIDATION_ERROR_SENTINEL;
use crate::error::Result;
use crate::metrics::PipelineMetrics;
use crate::pipeline::progress::Progress;
use crate::rate_limiter::RateLimiter;
use crate::types::{PostalAddress, ValidatedAddress, WorkingRecord};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub requested: usize,
    pub corrected: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Fold one service answer into the V_* columns for `address`.
pub fn merge_verification(address: &PostalAddress, answer: &AddressVerification) -> ValidatedAddress {
    let street2 = if answer.error.is_some() {
        String::new()
    } else if answer.secondary.is_empty() {
        address.address2.to_uppercase()
    } else {
        answer.secondary.clone()
    };

    let zipcode = if !answer.zip5.is_empty() && !answer.zip4.is_empty() {
        format!("{}-{}", answer.zip5, answer.zip4)
    } else {
        String::new()
    };

    ValidatedAddress {
        street: answer.street.clone(),
        street2,
        city: answer.city.clone(),
        state: answer.state.clone(),
        zipcode,
        zip5: answer.zip5.clone(),
        zip4: answer.zip4.clone(),
        validation_error: if answer.error.is_some() {
            VALIDATION_ERROR_SENTINEL.to_string()
        } else {
            String::new()
        },
    }
}

/// Verify every record, at most once each. Calls run concurrently under `limiter`;
/// a failed call leaves that record's V_* columns empty and never affects the others.
#[instrument(skip_all, fields(records = records.len(), verifier = verifier.name()))]
pub async fn validate_all(
    records: &mut [WorkingRecord],
    verifier: Arc<dyn AddressVerifier>,
    limiter: &RateLimiter,
    progress: &Progress,
) -> ValidationSummary {
    let mut summary = ValidationSummary {
        requested: records.len(),
        ..Default::default()
    };
    let mut tasks: JoinSet<(usize, Result<AddressVerification>)> = JoinSet::new();

    for record in records.iter() {
        let request = AddressRequest::from_address(&record.address);
        let row_id = record.row_id;
        let verifier = verifier.clone();
        let limiter = limiter.clone();
        tasks.spawn(async move {
            let _permit = limiter.acquire().await;
            let t0 = Instant::now();
            let answer = verifier.verify(&request).await;
            PipelineMetrics::record_verification(t0.elapsed().as_secs_f64(), answer.is_ok());
            (row_id, answer)
        });
    }

    let mut index: HashMap<usize, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.row_id, i))
        .collect();

    while let Some(joined) = tasks.join_next().await {
        progress.advance();
        let (row_id, answer) = match joined {
            Ok(done) => done,
            Err(e) => {
                warn!("Verification task did not complete: {}", e);
                summary.failed += 1;
                continue;
            }
        };
        let Some(position) = index.remove(&row_id) else {
            continue;
        };
        let record = &mut records[position];

        match answer {
            Ok(answer) => {
                record.validated = merge_verification(&record.address, &answer);
                if answer.error.is_some() {
                    record.review.escalate();
                    summary.rejected += 1;
                } else {
                    summary.corrected += 1;
                }
            }
            Err(e) => {
                warn!(row_id, "No address correction available: {}", e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Address validation: {} requested, {} corrected, {} rejected, {} failed",
        summary.requested, summary.corrected, summary.rejected, summary.failed
    );
    summary
}
