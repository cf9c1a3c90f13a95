//! OpenCorporates harvest module.
//!
//! Collects Belgian enterprise numbers from the company search so the
//! KBO step knows what to look up.

mod scraper;

pub use scraper::OpenCorporatesScraper;
