//! Prometheus metrics for roster runs.
//!
//! The recorder is installed once per process; `render()` returns the current
//! exposition text for the `/metrics` route. Before `init_metrics()` the
//! `metrics` macros are no-ops, so library users and tests need not install it.

use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Prometheus handle was already set");
                }
                info!("Prometheus recorder installed");
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

/// Current metrics in Prometheus text format, or None when no recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_rows_loaded(rows: usize) {
        ::metrics::counter!("roster_rows_loaded_total").increment(rows as u64);
    }

    pub fn record_organizations_removed(rows: usize) {
        ::metrics::counter!("roster_organizations_removed_total").increment(rows as u64);
    }

    pub fn record_name_outcomes(kept: usize, swapped: usize, flagged: usize, ambiguous: usize) {
        ::metrics::counter!("roster_names_kept_total").increment(kept as u64);
        ::metrics::counter!("roster_names_swapped_total").increment(swapped as u64);
        ::metrics::counter!("roster_names_flagged_total").increment(flagged as u64);
        ::metrics::counter!("roster_names_ambiguous_total").increment(ambiguous as u64);
    }

    pub fn record_address_split(blank: usize, non_domestic: usize, territories: usize) {
        ::metrics::counter!("roster_addresses_blank_total").increment(blank as u64);
        ::metrics::counter!("roster_addresses_non_domestic_total").increment(non_domestic as u64);
        ::metrics::counter!("roster_addresses_territory_total").increment(territories as u64);
    }

    /// One verification call; `answered` is false when no response was obtained
    pub fn record_verification(duration_secs: f64, answered: bool) {
        ::metrics::histogram!("roster_verification_duration_seconds").record(duration_secs);
        if answered {
            ::metrics::counter!("roster_verification_success_total").increment(1);
        } else {
            ::metrics::counter!("roster_verification_error_total").increment(1);
        }
    }

    pub fn record_run(rows_written: usize, duration_secs: f64) {
        ::metrics::counter!("roster_runs_total").increment(1);
        ::metrics::counter!("roster_rows_written_total").increment(rows_written as u64);
        ::metrics::histogram!("roster_run_duration_seconds").record(duration_secs);
    }

    pub fn record_run_failure() {
        ::metrics::counter!("roster_run_failures_total").increment(1);
    }
}
