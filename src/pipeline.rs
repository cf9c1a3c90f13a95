//! End to end flows tying the scrapers and the workbook together.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::HarvestConfig;
use crate::error::ScraperError;
use crate::kbo::{FunctionRecord, KboConfig, KboScraper};
use crate::numbers;
use crate::opencorporates::OpenCorporatesScraper;
use crate::traits::Scraper;
use crate::workbook::{self, CleanSummary};

/// What an extract or requeue run produced.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub workbook: PathBuf,
    /// Enterprise numbers that were looked up.
    pub numbers: usize,
    /// Function rows written to the workbook.
    pub rows: usize,
}

/// Harvest numbers (or take them from an existing file) and look each
/// one up on the KBO.
pub async fn run_extract(
    harvest: Option<HarvestConfig>,
    numbers_file: Option<PathBuf>,
    kbo: KboConfig,
    output: PathBuf,
) -> Result<ExtractOutcome, ScraperError> {
    let numbers_path = match (numbers_file, harvest) {
        (Some(path), _) => {
            info!("Using existing numbers file {:?}", path);
            path
        }
        (None, Some(config)) => {
            let mut scraper = OpenCorporatesScraper::new(config);
            scraper.execute().await?
        }
        (None, None) => {
            return Err(ScraperError::Extraction(
                "no numbers file and no harvest credentials".to_string(),
            ));
        }
    };

    let numbers = numbers::read_numbers(&numbers_path)?;
    info!("Found {} numbers to search", numbers.len());

    let records = lookup_records(&numbers, kbo).await?;

    workbook::write_records(&output, &records)?;
    info!("Wrote {} rows to {:?}", records.len(), output);

    Ok(ExtractOutcome {
        workbook: output,
        numbers: numbers.len(),
        rows: records.len(),
    })
}

/// Look up the companies behind nameless function rows and write their
/// rows to a fresh workbook.
pub async fn run_requeue(
    input: &Path,
    kbo: KboConfig,
    output: PathBuf,
) -> Result<ExtractOutcome, ScraperError> {
    let records = workbook::read_records(input)?;
    info!("Read {} rows from {:?}", records.len(), input);

    let mut numbers = Vec::new();
    for raw in workbook::requeue_numbers(&records) {
        match numbers::normalize(&raw) {
            Some(number) => numbers.push(number),
            None => warn!("Skipping invalid requeue number '{}'", raw),
        }
    }
    info!("{} numbers to requeue", numbers.len());

    // An empty candidate list still produces a workbook so downstream
    // steps have a file to pick up.
    let results = if numbers.is_empty() {
        Vec::new()
    } else {
        lookup_records(&numbers, kbo).await?
    };

    workbook::write_records(&output, &results)?;
    info!("Wrote {} rows to {:?}", results.len(), output);

    Ok(ExtractOutcome {
        workbook: output,
        numbers: numbers.len(),
        rows: results.len(),
    })
}

/// Rewrite a workbook without the rows whose function title matches.
pub fn run_clean(
    input: &Path,
    pattern: &str,
    output: &Path,
) -> Result<CleanSummary, ScraperError> {
    let records = workbook::read_records(input)?;
    let (kept, summary) = workbook::drop_matching_titles(records, pattern);
    workbook::write_records(output, &kept)?;
    Ok(summary)
}

/// Run the KBO lookups with a browser that is closed whatever the
/// lookup returned.
async fn lookup_records(
    numbers: &[String],
    config: KboConfig,
) -> Result<Vec<FunctionRecord>, ScraperError> {
    let mut scraper = KboScraper::new(config);
    scraper.initialize().await?;
    let result = scraper.lookup_all(numbers).await;
    scraper.close().await?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, first: &str, last: &str) -> FunctionRecord {
        FunctionRecord {
            company_number: "0403200393".to_string(),
            company_name: "Acme NV".to_string(),
            email: String::new(),
            function_title: title.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            person_company_number: String::new(),
        }
    }

    #[tokio::test]
    async fn test_run_extract_requires_a_number_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_extract(
            None,
            None,
            KboConfig::default(),
            dir.path().join("out.xlsx"),
        )
        .await;
        assert!(matches!(result, Err(ScraperError::Extraction(_))));
    }

    #[test]
    fn test_run_clean_filters_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("functions.xlsx");
        let output = dir.path().join("no_syndicus.xlsx");

        let records = vec![
            record("Syndicus", "Jan", "Peeters"),
            record("Bestuurder", "An", "Claes"),
            record("syndicus (vereniging)", "Piet", "Maes"),
        ];
        workbook::write_records(&input, &records).unwrap();

        let summary = run_clean(&input, "Syndicus", &output).unwrap();
        assert_eq!(summary.original, 3);
        assert_eq!(summary.removed, 2);
        assert_eq!(summary.remaining, 1);

        let kept = workbook::read_records(&output).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].function_title, "Bestuurder");
    }

    #[tokio::test]
    async fn test_run_requeue_without_candidates_writes_empty_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("functions.xlsx");
        let output = dir.path().join("followup.xlsx");

        // All rows have names, so no browser work is needed
        let records = vec![record("Bestuurder", "Jan", "Peeters")];
        workbook::write_records(&input, &records).unwrap();

        let outcome = run_requeue(&input, KboConfig::default(), output.clone())
            .await
            .unwrap();
        assert_eq!(outcome.numbers, 0);
        assert_eq!(outcome.rows, 0);
        assert!(workbook::read_records(&output).unwrap().is_empty());
    }
}
