use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use donor_roster::app::ports::AddressVerifier;
use donor_roster::config::{Config, DEFAULT_CONFIG_PATH};
use donor_roster::infra::{OfflineVerifier, UspsVerifier};
use donor_roster::logging;
use donor_roster::metrics;
use donor_roster::pipeline::{Pipeline, PipelineResult, Progress};
use donor_roster::rate_limiter::RateLimiter;
use donor_roster::server::{self, AppState};

#[derive(Parser)]
#[command(name = "donor_roster")]
#[command(about = "Clean and annotate donor-roster CSV exports")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one roster file
    Convert {
        input: PathBuf,
        /// Output path (default: <input stem>_modified.csv beside the input)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Input encoding label, e.g. ISO-8859-1 or utf-8
        #[arg(long)]
        encoding: Option<String>,
        /// Skip address verification; V_* columns stay empty
        #[arg(long)]
        offline: bool,
    },
    /// Run the upload/progress/download HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,
        /// Skip address verification for every upload
        #[arg(long)]
        offline: bool,
    },
}

fn build_verifier(config: &Config, offline: bool) -> anyhow::Result<Arc<dyn AddressVerifier>> {
    if offline {
        return Ok(Arc::new(OfflineVerifier));
    }
    let verifier = UspsVerifier::new(&config.verifier)
        .context("cannot verify addresses; set USPS_USER_ID or pass --offline")?;
    Ok(Arc::new(verifier))
}

fn print_summary(result: &PipelineResult) {
    let stats = &result.stats;
    println!("\n📊 Roster results for {}:", result.input_file);
    println!("   Rows loaded: {}", stats.rows_loaded);
    println!("   Organizations removed: {}", stats.organizations_removed);
    println!(
        "   Names kept/swapped/flagged/ambiguous: {}/{}/{}/{}",
        stats.names_kept, stats.names_swapped, stats.names_flagged, stats.names_ambiguous
    );
    println!(
        "   Dropped non-domestic: {}, territories: {}",
        stats.non_domestic, stats.territories
    );
    println!(
        "   Addresses corrected/rejected/unavailable: {}/{}/{}",
        stats.verification_corrected, stats.verification_rejected, stats.verification_failed
    );
    println!("   Rows written: {}", stats.rows_written);
    println!("   Output file: {}", result.output_file);
    println!("   Blank addresses ({}): {}", stats.blank_addresses, result.blank_file);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            encoding,
            offline,
        } => {
            if let Some(encoding) = encoding {
                config.pipeline.encoding = encoding;
            }
            let verifier = build_verifier(&config, offline)?;
            let limiter = RateLimiter::new(config.verifier.limits());
            let pipeline = Pipeline::new(verifier, limiter, config.pipeline.clone());

            info!("Converting {}", input.display());
            let progress = Progress::new();
            match pipeline.run_file(&input, output.as_deref(), &progress).await {
                Ok(result) => print_summary(&result),
                Err(e) => {
                    error!("Conversion failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Serve { port, offline } => {
            metrics::init_metrics();
            let port = port.unwrap_or(config.server.port);
            let verifier = build_verifier(&config, offline)?;
            let limiter = RateLimiter::new(config.verifier.limits());
            let pipeline = Pipeline::new(verifier, limiter, config.pipeline.clone());
            let state = AppState::new(pipeline, &config.server);
            server::start_server(state, port)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {}", e))?;
        }
    }
    Ok(())
}
