//! Roster cleaning pipeline: load, filter, transform names, annotate, shape and
//! verify addresses, then project to the output schema.
//!
//! Stages run one after another over the whole roster. Only the verification
//! stage is concurrent.

pub mod address;
pub mod annotate;
pub mod content_filter;
pub mod loader;
pub mod names;
pub mod progress;
pub mod projector;
pub mod validate;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use crate::app::ports::AddressVerifier;
use crate::config::PipelineConfig;
use crate::error::{Result, RosterError};
use crate::metrics::PipelineMetrics;
use crate::rate_limiter::RateLimiter;
use crate::types::WorkingRecord;

pub use progress::Progress;

/// Records ready to be written, plus the counts gathered on the way
#[derive(Debug)]
pub struct RosterOutcome {
    pub records: Vec<WorkingRecord>,
    pub blank: Vec<WorkingRecord>,
    pub stats: RunStats,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub rows_loaded: usize,
    pub blank_rows: usize,
    pub organizations_removed: usize,
    pub names_kept: usize,
    pub names_swapped: usize,
    pub names_flagged: usize,
    pub names_ambiguous: usize,
    pub non_domestic: usize,
    pub territories: usize,
    pub blank_addresses: usize,
    pub verification_requested: usize,
    pub verification_corrected: usize,
    pub verification_rejected: usize,
    pub verification_failed: usize,
    pub rows_written: usize,
}

/// Result of a complete file-to-file run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub input_file: String,
    pub output_file: String,
    pub blank_file: String,
    pub duration_secs: f64,
    pub stats: RunStats,
}

pub struct Pipeline {
    verifier: Arc<dyn AddressVerifier>,
    limiter: RateLimiter,
    options: PipelineConfig,
}

impl Pipeline {
    pub fn new(verifier: Arc<dyn AddressVerifier>, limiter: RateLimiter, options: PipelineConfig) -> Self {
        Self {
            verifier,
            limiter,
            options,
        }
    }

    /// Run every stage over raw file bytes. Nothing is written.
    #[instrument(skip_all, fields(bytes = bytes.len(), verifier = self.verifier.name()))]
    pub async fn process(&self, bytes: &[u8], progress: &Progress) -> Result<RosterOutcome> {
        let loaded = loader::load_roster(bytes, &self.options.encoding)?;
        let mut stats = RunStats {
            rows_loaded: loaded.records.len(),
            blank_rows: loaded.blank_rows,
            ..Default::default()
        };
        PipelineMetrics::record_rows_loaded(stats.rows_loaded);

        let (mut records, removed) = content_filter::filter_organizations(loaded.records);
        stats.organizations_removed = removed;
        PipelineMetrics::record_organizations_removed(removed);

        let names = names::transform_all(&mut records);
        stats.names_kept = names.kept;
        stats.names_swapped = names.swapped;
        stats.names_flagged = names.flagged;
        stats.names_ambiguous = names.ambiguous;
        PipelineMetrics::record_name_outcomes(names.kept, names.swapped, names.flagged, names.ambiguous);

        annotate::annotate_all(&mut records);

        let split = address::shape_addresses(records, &self.options.domestic_country);
        stats.non_domestic = split.non_domestic;
        stats.territories = split.territories;
        stats.blank_addresses = split.blank.len();
        PipelineMetrics::record_address_split(split.blank.len(), split.non_domestic, split.territories);

        let mut records = split.records;
        let mut blank = split.blank;

        progress.start(records.len());
        let verified = validate::validate_all(&mut records, self.verifier.clone(), &self.limiter, progress).await;
        stats.verification_requested = verified.requested;
        stats.verification_corrected = verified.corrected;
        stats.verification_rejected = verified.rejected;
        stats.verification_failed = verified.failed;

        projector::sort_for_output(&mut records);
        projector::sort_for_output(&mut blank);
        stats.rows_written = records.len();

        Ok(RosterOutcome { records, blank, stats })
    }

    /// Read `input`, process it and write the cleaned roster plus the blank-address
    /// bucket. Both files are written only after every stage has completed.
    #[instrument(skip(self, progress), fields(input = %input.display()))]
    pub async fn run_file(&self, input: &Path, output: Option<&Path>, progress: &Progress) -> Result<PipelineResult> {
        let t0 = Instant::now();
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        if same_file(input, &output) {
            return Err(RosterError::Config(format!(
                "output path '{}' would overwrite the input",
                output.display()
            )));
        }
        let blank_file = blank_bucket_path(input, &output);

        let bytes = std::fs::read(input)?;
        let outcome = match self.process(&bytes, progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                PipelineMetrics::record_run_failure();
                return Err(e);
            }
        };

        projector::write_roster_file(&output, &outcome.records)?;
        projector::write_roster_file(&blank_file, &outcome.blank)?;
        progress.finish();

        let duration_secs = t0.elapsed().as_secs_f64();
        PipelineMetrics::record_run(outcome.stats.rows_written, duration_secs);
        info!(
            "Roster run complete: {} rows in, {} rows out, {} blank addresses ({:.2}s)",
            outcome.stats.rows_loaded, outcome.stats.rows_written, outcome.stats.blank_addresses, duration_secs
        );

        Ok(PipelineResult {
            input_file: input.display().to_string(),
            output_file: output.display().to_string(),
            blank_file: blank_file.display().to_string(),
            duration_secs,
            stats: outcome.stats,
        })
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "roster".to_string())
}

/// `<dir>/<stem>_modified.csv` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}_modified.csv", stem(input)))
}

/// `<stem>_blank_addresses.csv` in the output's directory, named after the input
pub fn blank_bucket_path(input: &Path, output: &Path) -> PathBuf {
    output.with_file_name(format!("{}_blank_addresses.csv", stem(input)))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
