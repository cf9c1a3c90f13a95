//! Full extract run through the tower service.
//!
//! Usage:
//! ```
//! OC_EMAIL=... OC_PASSWORD=... cargo run --example extract_service
//! ```

use kbo_scraper::{ExtractRequest, ScraperService};
use tower::Service;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env when present
    if let Ok(env_path) = std::fs::canonicalize(".env") {
        println!("Loading .env from: {:?}", env_path);
        for line in std::fs::read_to_string(".env")?.lines() {
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('\'').trim_matches('"');
                if !key.starts_with('#') && !key.is_empty() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    let email = std::env::var("OC_EMAIL").expect("OC_EMAIL not set");
    let password = std::env::var("OC_PASSWORD").expect("OC_PASSWORD not set");

    println!("=== Extract via ScraperService ===");
    println!("Email: {}", email);
    println!("Pages: 2 (testing cap)");
    println!();

    let mut service = ScraperService::new();
    let request = ExtractRequest::new(email, password)
        .with_max_pages(Some(2))
        .with_output("company_functions.xlsx");

    let outcome = service.call(request).await?;

    println!();
    println!("=== Results ===");
    println!("Numbers looked up: {}", outcome.numbers);
    println!("Rows written: {}", outcome.rows);
    println!("Workbook: {:?}", outcome.workbook);
    println!();
    println!("Extract completed successfully!");

    Ok(())
}
