//! Kessan CLI binary.
//!
//! Provides command-line interface for extracting and grading the figures of
//! earnings reports published on EDINET.

mod integration;

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::pipeline::{self, DEFAULT_CONCURRENCY, PipelineConfig};
use kessan_data::edinet::{
    DEFAULT_BASE_URL, DocumentKind, EdinetClient, EdinetConfig, filter_earnings_reports,
    parse_date,
};
use kessan_output::{ExportFormat, Exporter, render_summary};
use kessan_xbrl::PeriodClassifier;
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log filter used when `RUST_LOG` is not set. Target directives match by
/// prefix, so `kessan` also covers the `kessan_*` library crates.
const DEFAULT_LOG_FILTER: &str = "warn,kessan=info";

/// Log filter used with `--verbose` when `RUST_LOG` is not set.
const VERBOSE_LOG_FILTER: &str = "warn,kessan=debug";

#[derive(Parser)]
#[command(name = "kessan")]
#[command(about = "Kessan: earnings-report figures from EDINET XBRL filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory for cached archives and saved reports
    #[arg(long, global = true, env = "KESSAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// EDINET subscription key
    #[arg(long, global = true, env = "EDINET_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// EDINET API host
    #[arg(long, global = true, env = "EDINET_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// First day of the current fiscal year (YYYY-MM-DD)
    #[arg(long, global = true)]
    fiscal_year_start: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every earnings report submitted on a date
    Analyze {
        /// Submission date (YYYY-MM-DD), yesterday when omitted
        date: Option<String>,

        /// Also save the report as CSV
        #[arg(long)]
        csv: bool,

        /// Number of filings processed at once
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Disable the archive cache
        #[arg(long)]
        no_cache: bool,

        /// Download archives even when cached
        #[arg(long)]
        refresh: bool,
    },

    /// List earnings reports submitted on a date
    List {
        /// Submission date (YYYY-MM-DD), yesterday when omitted
        date: Option<String>,
    },

    /// Extract figures from a local filing archive
    Parse {
        /// Path to the archive
        archive: PathBuf,

        /// Treat the file as a bare XBRL instance instead of a ZIP archive
        #[arg(long)]
        document: bool,
    },

    /// Download one filing
    Download {
        /// EDINET document id (S100XXXX)
        doc_id: String,

        /// Download the PDF instead of the XBRL archive
        #[arg(long)]
        pdf: bool,

        /// Target directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = match cli.fiscal_year_start.as_deref() {
        Some(text) => {
            let start = parse_date(text)?;
            PeriodClassifier::for_fiscal_year_starting(start)
                .ok_or_else(|| format!("No previous fiscal year for {}", start))?
        }
        None => PeriodClassifier::default(),
    };

    let edinet_config = EdinetConfig {
        api_key: cli.api_key.filter(|key| !key.trim().is_empty()),
        base_url: cli.base_url,
        ..EdinetConfig::default()
    };

    match cli.command {
        Commands::Analyze {
            date,
            csv,
            concurrency,
            no_cache,
            refresh,
        } => {
            let date = resolve_date(date.as_deref())?;
            let config = PipelineConfig {
                data_dir: cli.data_dir.unwrap_or_else(cache_manager::default_data_dir),
                use_cache: !no_cache,
                force_refresh: refresh,
                concurrency,
                classifier,
            };
            let client = EdinetClient::new(edinet_config)?;
            analyze_date(&client, &config, date, csv).await?;
        }
        Commands::List { date } => {
            let date = resolve_date(date.as_deref())?;
            let client = EdinetClient::new(edinet_config)?;
            list_earnings_reports(&client, date).await?;
        }
        Commands::Parse { archive, document } => {
            let result = pipeline::extract_local(archive, document, classifier).await?;
            println!("{}", result.export_to_string(ExportFormat::PrettyJson)?);
        }
        Commands::Download {
            doc_id,
            pdf,
            output,
        } => {
            let kind = if pdf {
                DocumentKind::Pdf
            } else {
                DocumentKind::Xbrl
            };
            let client = EdinetClient::new(edinet_config)?;
            let path = client.download_to(&doc_id, kind, &output, &doc_id).await?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}

/// Parses a `YYYY-MM-DD` argument, defaulting to yesterday.
fn resolve_date(text: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match text {
        Some(text) => Ok(parse_date(text)?),
        None => Ok(Local::now().date_naive() - Duration::days(1)),
    }
}

async fn analyze_date(
    client: &EdinetClient,
    config: &PipelineConfig,
    date: NaiveDate,
    with_csv: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("EARNINGS REPORT ANALYSIS: {}", date));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if config.use_cache {
        println!("  Data directory: {}", config.data_dir.display());
        if config.force_refresh {
            println!("  Mode: Force refresh (re-downloading all archives)");
        }
    } else {
        println!("  Cache: Disabled");
    }
    println!();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message("Fetching document list...");

    let outcome = match pipeline::run_batch(client, config, date, Some(&pb)).await {
        Ok(outcome) => {
            pb.finish_with_message(format!(
                "Analyzed {} of {} filings",
                outcome.report.total_count, outcome.filings
            ));
            outcome
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    println!();
    print!("{}", render_summary(&outcome.report.results));
    if outcome.skipped() > 0 {
        println!("\n  Skipped: {} filing(s) without usable data", outcome.skipped());
    }

    let paths = pipeline::save_report(&outcome.report, config, with_csv)?;
    println!();
    for path in paths {
        println!("Saved {}", path.display());
    }

    Ok(())
}

async fn list_earnings_reports(
    client: &EdinetClient,
    date: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = client.fetch_documents(date).await?;
    let reports = filter_earnings_reports(&list);

    println!("Earnings reports submitted on {}", date);
    println!("=====================================\n");

    if reports.is_empty() {
        println!("No earnings reports found ({} documents listed).", list.len());
        return Ok(());
    }

    for doc in &reports {
        println!(
            "  {:<6} {:<10} {:<30} {}",
            doc.sec_code.as_deref().unwrap_or("-"),
            doc.doc_id,
            doc.filer_name.as_deref().unwrap_or("-"),
            doc.doc_description.as_deref().unwrap_or("")
        );
    }
    println!("\n{} of {} documents", reports.len(), list.len());

    Ok(())
}
