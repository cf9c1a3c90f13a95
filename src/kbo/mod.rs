//! KBO lookup module.
//!
//! Searches the public register by enterprise number and turns the
//! result pages into officer/function rows.

pub mod parse;
mod scraper;
mod types;

pub use parse::{parse_holder, records_from_extract, ParsedHolder};
pub use scraper::KboScraper;
pub use types::{CompanyExtract, FunctionEntry, FunctionRecord, KboConfig};
