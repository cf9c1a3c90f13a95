use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kbo_scraper::kbo::KboConfig;
use kbo_scraper::{pipeline, HarvestConfig, ScraperError};

#[derive(Parser)]
#[command(
    name = "kbo-scraper",
    about = "Officer/function scraper for the Belgian company register (KBO)",
    version
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest enterprise numbers and extract function rows into a workbook
    Extract {
        /// Reuse an existing numbers file instead of harvesting
        #[arg(long)]
        numbers_file: Option<PathBuf>,
        /// Where a fresh harvest writes its numbers
        #[arg(long, default_value = "company_numbers.txt")]
        numbers_output: PathBuf,
        /// Output workbook
        #[arg(long, default_value = "company_functions.xlsx")]
        output: PathBuf,
        /// OpenCorporates account email
        #[arg(long, env = "OC_EMAIL", default_value = "")]
        email: String,
        /// OpenCorporates account password
        #[arg(long, env = "OC_PASSWORD", default_value = "", hide_env_values = true)]
        password: String,
        /// Stop the harvest after this many result pages
        #[arg(long)]
        max_pages: Option<u32>,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
        /// Save screenshots and raw extracts while scraping
        #[arg(long)]
        debug: bool,
    },
    /// Look up the companies behind nameless function rows
    Requeue {
        /// Workbook produced by extract
        #[arg(long, default_value = "company_functions.xlsx")]
        input: PathBuf,
        /// Output workbook
        #[arg(long, default_value = "company_functions_followup.xlsx")]
        output: PathBuf,
        /// Show the browser window
        #[arg(long)]
        headed: bool,
        /// Save screenshots and raw extracts while scraping
        #[arg(long)]
        debug: bool,
    },
    /// Drop rows whose function title matches a pattern
    Clean {
        /// Workbook to clean
        #[arg(long, default_value = "company_functions.xlsx")]
        input: PathBuf,
        /// Case insensitive substring to drop
        #[arg(long, default_value = "Syndicus")]
        pattern: String,
        /// Output workbook
        #[arg(long, default_value = "company_functions_no_syndicus.xlsx")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "info,kbo_scraper=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command).await {
        eprintln!("kbo-scraper error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), ScraperError> {
    match command {
        Commands::Extract {
            numbers_file,
            numbers_output,
            output,
            email,
            password,
            max_pages,
            headed,
            debug,
        } => {
            let harvest = if numbers_file.is_some() {
                None
            } else {
                Some(
                    HarvestConfig::new(email, password)
                        .with_numbers_path(numbers_output)
                        .with_max_pages(max_pages)
                        .with_headless(!headed)
                        .with_debug(debug),
                )
            };
            let kbo = KboConfig::new().with_headless(!headed).with_debug(debug);

            let outcome = pipeline::run_extract(harvest, numbers_file, kbo, output).await?;
            println!("Looked up {} numbers", outcome.numbers);
            println!(
                "Wrote {} rows to {}",
                outcome.rows,
                outcome.workbook.display()
            );
        }
        Commands::Requeue {
            input,
            output,
            headed,
            debug,
        } => {
            let kbo = KboConfig::new().with_headless(!headed).with_debug(debug);
            let outcome = pipeline::run_requeue(&input, kbo, output).await?;
            println!("Requeued {} numbers", outcome.numbers);
            println!(
                "Wrote {} rows to {}",
                outcome.rows,
                outcome.workbook.display()
            );
        }
        Commands::Clean {
            input,
            pattern,
            output,
        } => {
            let summary = pipeline::run_clean(&input, &pattern, &output)?;
            println!("Original rows: {}", summary.original);
            println!("Rows removed: {}", summary.removed);
            println!("Remaining rows: {}", summary.remaining);
            println!("Saved to: {}", output.display());
        }
    }
    Ok(())
}
