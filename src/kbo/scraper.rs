//! Lookup of company records on the public KBO search.
//!
//! Each enterprise number is typed into the number search form and the
//! result page is read in-page. No login is required.

use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser;
use crate::error::ScraperError;

use super::parse;
use super::types::{CompanyExtract, FunctionRecord, KboConfig};

const SEARCH_FORM_URL: &str = "https://kbopub.economie.fgov.be/kbopub/zoeknummerform.html";
const NUMBER_INPUT: &str = "#nummer";
const SEARCH_BUTTON: &str = "#actionLu";
const FORM_WAIT_SECS: u64 = 15;

/// In-page extraction of the company record shown after a number search.
///
/// The page is a label/value table. Labels are matched in Dutch and
/// English since the registry serves both. Function rows live in the
/// `#toonfctie` block; a heading scan covers pages where that block is
/// missing.
const EXTRACT_JS: &str = r#"
(() => {
    const clean = (s) => (s || '').replace(/\u00a0/g, ' ').replace(/\s+/g, ' ').trim();
    const result = { found: false, enterpriseNumber: '', name: '', email: '', functions: [] };

    for (const row of document.querySelectorAll('table tr')) {
        const cells = row.querySelectorAll('td');
        if (cells.length < 2) continue;
        const label = clean(cells[0].textContent).toLowerCase();
        if (label.startsWith('ondernemingsnummer') || label.startsWith('enterprise number')) {
            result.found = true;
            result.enterpriseNumber = clean(cells[1].textContent).split(' ')[0];
        } else if (label === 'naam:' || label === 'name:') {
            const firstLine = cells[1].childNodes.length > 0
                ? cells[1].childNodes[0].textContent
                : cells[1].textContent;
            result.name = clean(firstLine);
        } else if (label.startsWith('e-mail')) {
            result.email = clean(cells[1].textContent);
        }
    }

    const collectRows = (root) => {
        for (const row of root.querySelectorAll('tr')) {
            const cells = row.querySelectorAll('td');
            if (cells.length >= 2) {
                const title = clean(cells[0].textContent);
                const holder = clean(cells[1].textContent);
                if (title || holder) {
                    result.functions.push({ title: title, holder: holder });
                }
            }
        }
    };

    const fctie = document.querySelector('#toonfctie');
    if (fctie) {
        collectRows(fctie);
    } else {
        for (const heading of document.querySelectorAll('h2')) {
            if (clean(heading.textContent).toLowerCase().startsWith('functi')) {
                let node = heading.nextElementSibling;
                while (node && node.tagName !== 'H2') {
                    if (node.tagName === 'TABLE') {
                        collectRows(node);
                        break;
                    }
                    node = node.nextElementSibling;
                }
                break;
            }
        }
    }

    return JSON.stringify(result);
})()
"#;

pub struct KboScraper {
    config: KboConfig,
    browser: Option<Browser>,
}

impl KboScraper {
    pub fn new(config: KboConfig) -> Self {
        Self {
            config,
            browser: None,
        }
    }

    pub async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser for KBO lookups...");
        let browser = browser::launch(self.config.headless, self.config.debug).await?;
        self.browser = Some(browser);
        Ok(())
    }

    /// Look up every number and collect the function rows of the
    /// companies that were found.
    ///
    /// A lookup that fails or finds nothing is logged and skipped so a
    /// long run survives individual bad numbers.
    pub async fn lookup_all(
        &self,
        numbers: &[String],
    ) -> Result<Vec<FunctionRecord>, ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("Browser not initialized".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let total = numbers.len();
        let mut records = Vec::new();

        for (index, number) in numbers.iter().enumerate() {
            info!("Looking up {} ({}/{})", number, index + 1, total);

            match self.lookup(&page, number).await {
                Ok(extract) if extract.found => {
                    let rows = parse::records_from_extract(&extract);
                    info!(
                        "Company '{}': {} function rows",
                        extract.name,
                        rows.len()
                    );
                    if self.config.debug {
                        self.save_raw_extract(number, &extract);
                    }
                    records.extend(rows);
                }
                Ok(_) => {
                    warn!("No company record found for {}", number);
                }
                Err(e) => {
                    warn!("Lookup failed for {}: {}", number, e);
                }
            }

            if index + 1 < total {
                sleep(self.config.pause).await;
            }
        }

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        info!(
            "Collected {} function rows from {} numbers",
            records.len(),
            total
        );
        Ok(records)
    }

    /// Run one number through the search form and extract the result.
    async fn lookup(&self, page: &Page, number: &str) -> Result<CompanyExtract, ScraperError> {
        page.goto(SEARCH_FORM_URL)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        browser::wait_for_selector(page, NUMBER_INPUT, Duration::from_secs(FORM_WAIT_SECS))
            .await?;

        page.find_element(NUMBER_INPUT)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("number input: {}", e)))?
            .type_str(number)
            .await
            .map_err(|e| ScraperError::Navigation(format!("typing number: {}", e)))?;
        debug!("Number entered");

        page.find_element(SEARCH_BUTTON)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("search button: {}", e)))?
            .click()
            .await
            .map_err(|e| ScraperError::Navigation(format!("search click: {}", e)))?;

        browser::wait_request_idle(page).await?;
        browser::wait_stable(page).await?;

        if self.config.debug {
            browser::debug_screenshot(page, &format!("kbo {}", number)).await;
        }

        let result = page
            .evaluate(EXTRACT_JS)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        let json_str = result.into_value::<String>().unwrap_or_default();
        let extract: CompanyExtract =
            serde_json::from_str(&json_str).map_err(|e| ScraperError::Json(e.to_string()))?;

        Ok(extract)
    }

    /// Save the raw extraction payload for offline inspection.
    fn save_raw_extract(&self, number: &str, extract: &CompanyExtract) {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("./data/kbo_{}_{}.json", number, timestamp);

        if let Err(e) = std::fs::create_dir_all("./data") {
            warn!("Failed to create data directory: {}", e);
            return;
        }

        match serde_json::to_string_pretty(extract) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&filename, json) {
                    error!("Failed to save raw extract: {}", e);
                } else {
                    info!("Saved raw extract to {}", filename);
                }
            }
            Err(e) => error!("Failed to serialize raw extract: {}", e),
        }
    }

    pub async fn close(&mut self) -> Result<(), ScraperError> {
        self.browser = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kbo_scraper_new() {
        let scraper = KboScraper::new(KboConfig::default());
        assert!(scraper.browser.is_none());
    }

    #[tokio::test]
    #[ignore] // live test: cargo test test_kbo_lookup -- --ignored --nocapture
    async fn test_kbo_lookup() {
        tracing_subscriber::fmt()
            .with_env_filter("info,kbo_scraper=debug")
            .init();

        let config = KboConfig::new().with_debug(true);
        let mut scraper = KboScraper::new(config);
        scraper
            .initialize()
            .await
            .expect("Failed to initialize browser");

        // National Bank of Belgium, a stable public record
        let numbers = vec!["0203201340".to_string()];
        let result = scraper.lookup_all(&numbers).await;
        scraper.close().await.expect("Failed to close browser");

        match result {
            Ok(records) => {
                println!("\n=== Lookup Result ===");
                println!("Rows: {}", records.len());
                for r in &records {
                    println!(
                        "  - {} | {} | {} {} | {}",
                        r.company_number,
                        r.function_title,
                        r.first_name,
                        r.last_name,
                        r.person_company_number
                    );
                }
            }
            Err(e) => panic!("Lookup failed: {:?}", e),
        }
    }
}
