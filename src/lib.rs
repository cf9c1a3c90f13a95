//! Officer/function scraper for the Belgian company register (KBO).
//!
//! - Harvest Belgian enterprise numbers from OpenCorporates search results
//! - Look each number up on the public KBO search and extract the
//!   officer/function rows into a workbook
//! - Requeue rows that name a company instead of a person
//! - Clean workbooks by dropping unwanted function titles
//!
//! # Extract via the service
//!
//! ```rust,ignore
//! use kbo_scraper::{ExtractRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ExtractRequest::new("user@example.com", "password")
//!         .with_output("company_functions.xlsx")
//!         .with_max_pages(Some(2));
//!
//!     let outcome = service.call(request).await.unwrap();
//!     println!("Wrote {} rows to {:?}", outcome.rows, outcome.workbook);
//! }
//! ```
//!
//! # Direct KBO lookups
//!
//! ```rust,ignore
//! use kbo_scraper::kbo::{KboConfig, KboScraper};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut scraper = KboScraper::new(KboConfig::default());
//!     scraper.initialize().await.unwrap();
//!     let records = scraper.lookup_all(&["0403200393".to_string()]).await.unwrap();
//!     scraper.close().await.unwrap();
//!     println!("Function rows: {}", records.len());
//! }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod kbo;
pub mod numbers;
pub mod opencorporates;
pub mod pipeline;
pub mod service;
pub mod traits;
pub mod workbook;

// Re-export the main types
pub use config::HarvestConfig;
pub use error::ScraperError;
pub use kbo::{CompanyExtract, FunctionEntry, FunctionRecord, KboConfig, KboScraper};
pub use opencorporates::OpenCorporatesScraper;
pub use pipeline::ExtractOutcome;
pub use service::{ExtractRequest, ScraperService};
pub use traits::Scraper;
