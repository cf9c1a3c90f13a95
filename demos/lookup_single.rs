//! Look up a single enterprise number on the KBO.
//!
//! Usage:
//! ```
//! cargo run --example lookup_single -- 0403200393
//! ```

use kbo_scraper::kbo::{KboConfig, KboScraper};
use kbo_scraper::{numbers, ScraperError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let raw = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0403200393".to_string());
    let number =
        numbers::normalize(&raw).ok_or_else(|| ScraperError::InvalidNumber(raw.clone()))?;

    println!("=== KBO Lookup ===");
    println!("Enterprise number: {}", number);
    println!("Headless: false (visible browser)");
    println!();

    let config = KboConfig::new().with_headless(false).with_debug(true);
    let mut scraper = KboScraper::new(config);

    println!("Initializing browser...");
    scraper.initialize().await?;

    println!("Looking up...");
    let records = scraper.lookup_all(&[number]).await?;
    scraper.close().await?;

    println!();
    println!("=== Results ===");
    println!("Function rows: {}", records.len());
    for (i, record) in records.iter().take(10).enumerate() {
        let holder = if record.person_company_number.is_empty() {
            format!("{} {}", record.first_name, record.last_name)
        } else {
            format!("company {}", record.person_company_number)
        };
        println!("{}. {} - {}", i + 1, record.function_title, holder.trim());
    }
    if records.len() > 10 {
        println!("... and {} more", records.len() - 10);
    }

    println!();
    println!("Lookup completed!");
    Ok(())
}
