//! Harvest of Belgian enterprise numbers from OpenCorporates search
//! results.
//!
//! Signs in, walks the paginated company search for Belgium and collects
//! the enterprise numbers out of the result links. Numbers land in a
//! plain text file, one per line, for the KBO lookup step.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::Page;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::HarvestConfig;
use crate::error::ScraperError;
use crate::numbers;
use crate::traits::Scraper;

const SEARCH_URL: &str = "https://opencorporates.com/companies/be?action=search_companies&branch=false&commit=Go&controller=searches&inactive=false&mode=best_fields&nonprofit=&order=&q=&search_fields%5B%5D=name&type=companies&utf8=%E2%9C%93";
/// Where the site lands after a successful sign-in.
const SIGNED_IN_URL: &str = "https://opencorporates.com/?logged_in";
const RESULT_WAIT_SECS: u64 = 20;

/// Company profile links on a result page, e.g. `/companies/be/0403200393`.
static BE_COMPANY_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/companies/be/(\d+)").unwrap());

/// Collect the hrefs of all result links on the current page. The
/// result entries are anchors carrying the class themselves.
const COLLECT_JS: &str = r#"
(() => {
    const hrefs = [];
    for (const link of document.querySelectorAll('.company_search_result')) {
        const href = link.getAttribute('href');
        if (href) {
            hrefs.push(href);
        }
    }
    return JSON.stringify(hrefs);
})()
"#;

/// Click the next page link if there is one. Returns whether a click
/// happened; on the last page the next control is a disabled span with
/// no link inside it.
const NEXT_PAGE_JS: &str = r#"
(() => {
    const next = document.querySelector('.next_page [href]');
    if (next) {
        next.click();
        return true;
    }
    return false;
})()
"#;

/// Add the enterprise numbers found in `hrefs` to `numbers`. First
/// occurrence wins and input order is preserved; hrefs without a valid
/// number are skipped. Returns how many numbers were new.
fn add_numbers_from_hrefs(
    hrefs: &[String],
    numbers: &mut Vec<String>,
    seen: &mut HashSet<String>,
) -> usize {
    let mut added = 0;
    for href in hrefs {
        let Some(captures) = BE_COMPANY_HREF.captures(href) else {
            continue;
        };
        match numbers::normalize(&captures[1]) {
            Some(number) => {
                if seen.insert(number.clone()) {
                    numbers.push(number);
                    added += 1;
                }
            }
            None => warn!("Skipping malformed company href '{}'", href),
        }
    }
    added
}

pub struct OpenCorporatesScraper {
    config: HarvestConfig,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
}

impl OpenCorporatesScraper {
    pub fn new(config: HarvestConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
        }
    }

    fn get_page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("Browser not initialized".into()))
    }

    /// Pull the enterprise numbers out of one result page.
    async fn collect_page(
        &self,
        page: &Page,
        numbers: &mut Vec<String>,
        seen: &mut HashSet<String>,
    ) -> Result<usize, ScraperError> {
        let result = page
            .evaluate(COLLECT_JS)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        let json_str = result.into_value::<String>().unwrap_or_default();
        let hrefs: Vec<String> =
            serde_json::from_str(&json_str).map_err(|e| ScraperError::Json(e.to_string()))?;

        Ok(add_numbers_from_hrefs(&hrefs, numbers, seen))
    }
}

#[async_trait]
impl Scraper for OpenCorporatesScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser for OpenCorporates harvest...");

        let browser = browser::launch(self.config.headless, self.config.debug).await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));
        Ok(())
    }

    async fn login(&mut self) -> Result<(), ScraperError> {
        if self.config.email.is_empty() || self.config.password.is_empty() {
            return Err(ScraperError::Login(
                "missing credentials, set OC_EMAIL and OC_PASSWORD".to_string(),
            ));
        }

        let page = self.get_page()?.clone();
        info!("Signing in to OpenCorporates...");

        // The search page is behind authentication and presents the
        // sign-in form to anonymous sessions.
        page.goto(SEARCH_URL)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        browser::wait_for_selector(&page, "#user_email", Duration::from_secs(15)).await?;

        page.find_element("#user_email")
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("email field: {}", e)))?
            .type_str(&self.config.email)
            .await
            .map_err(|e| ScraperError::Login(format!("typing email: {}", e)))?;

        page.find_element("#user_password")
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("password field: {}", e)))?
            .type_str(&self.config.password)
            .await
            .map_err(|e| ScraperError::Login(format!("typing password: {}", e)))?;

        if self.config.debug {
            browser::debug_screenshot(&page, "sign-in").await;
        }

        page.find_element("button[type='submit']")
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("submit button: {}", e)))?
            .click()
            .await
            .map_err(|e| ScraperError::Login(format!("submit click: {}", e)))?;

        browser::wait_request_idle(&page).await?;

        // A failed sign-in re-renders the form; success redirects to the
        // logged-in landing page.
        for i in 0..15 {
            let href = page
                .evaluate("window.location.href")
                .await
                .map_err(|e| ScraperError::JavaScript(e.to_string()))?
                .into_value::<String>()
                .unwrap_or_default();

            if href.starts_with(SIGNED_IN_URL) {
                info!("Signed in");
                return Ok(());
            }

            if i % 5 == 0 {
                info!("Waiting for sign-in to complete... ({}/15)", i + 1);
            }
            sleep(Duration::from_secs(1)).await;
        }

        Err(ScraperError::Login(
            "never reached the signed-in landing page, check credentials".to_string(),
        ))
    }

    async fn harvest(&mut self) -> Result<PathBuf, ScraperError> {
        let page = self.get_page()?.clone();
        info!("Starting company search harvest...");

        page.goto(SEARCH_URL)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        let mut numbers: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_index: u32 = 1;

        loop {
            browser::wait_for_selector(&page, "#results", Duration::from_secs(RESULT_WAIT_SECS))
                .await?;

            let added = self.collect_page(&page, &mut numbers, &mut seen).await?;
            info!(
                "Result page {}: {} new numbers ({} total)",
                page_index,
                added,
                numbers.len()
            );

            if let Some(max) = self.config.max_pages {
                if page_index >= max {
                    info!("Reached page limit ({}), stopping", max);
                    break;
                }
            }

            let clicked = page
                .evaluate(NEXT_PAGE_JS)
                .await
                .map_err(|e| ScraperError::JavaScript(e.to_string()))?
                .into_value::<bool>()
                .unwrap_or(false);

            if !clicked {
                debug!("No next page link, search exhausted");
                break;
            }

            browser::wait_request_idle(&page).await?;
            sleep(Duration::from_secs(1)).await;
            page_index += 1;
        }

        numbers::write_numbers(&self.config.numbers_path, &numbers)?;
        info!(
            "Wrote {} enterprise numbers to {:?}",
            numbers.len(),
            self.config.numbers_path
        );

        Ok(self.config.numbers_path.clone())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.page = None;
        self.browser = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opencorporates_scraper_new() {
        let config = HarvestConfig::new("user@example.com", "secret");
        let scraper = OpenCorporatesScraper::new(config);
        assert!(scraper.browser.is_none());
        assert!(scraper.page.is_none());
    }

    #[test]
    fn test_href_regex() {
        let captures = BE_COMPANY_HREF
            .captures("/companies/be/0403200393")
            .unwrap();
        assert_eq!(&captures[1], "0403200393");

        let captures = BE_COMPANY_HREF
            .captures("https://opencorporates.com/companies/be/403200393?utm=x")
            .unwrap();
        assert_eq!(&captures[1], "403200393");

        assert!(BE_COMPANY_HREF.captures("/companies/nl/12345678").is_none());
    }

    #[test]
    fn test_collect_dedupes_across_pages_keeping_first_seen_order() {
        let mut numbers = Vec::new();
        let mut seen = HashSet::new();

        let first_page = vec![
            "/companies/be/0403200393".to_string(),
            // Nine digits in the href, stored with the zero restored
            "/companies/be/417497106".to_string(),
            "/companies/nl/12345678".to_string(),
            "/about".to_string(),
        ];
        assert_eq!(
            add_numbers_from_hrefs(&first_page, &mut numbers, &mut seen),
            2
        );

        let second_page = vec![
            "/companies/be/0403200393".to_string(),
            "/companies/be/12345678901".to_string(),
            "/companies/be/0600000000".to_string(),
        ];
        assert_eq!(
            add_numbers_from_hrefs(&second_page, &mut numbers, &mut seen),
            1
        );

        assert_eq!(
            numbers,
            vec![
                "0403200393".to_string(),
                "0417497106".to_string(),
                "0600000000".to_string()
            ]
        );
    }

    #[tokio::test]
    #[ignore] // live test: cargo test test_opencorporates_harvest -- --ignored --nocapture
    async fn test_opencorporates_harvest() {
        tracing_subscriber::fmt()
            .with_env_filter("info,kbo_scraper=debug")
            .init();

        let email = std::env::var("OC_EMAIL").expect("OC_EMAIL not set");
        let password = std::env::var("OC_PASSWORD").expect("OC_PASSWORD not set");

        let dir = tempfile::tempdir().expect("tempdir");
        let config = HarvestConfig::new(email, password)
            .with_numbers_path(dir.path().join("company_numbers.txt"))
            .with_max_pages(Some(2))
            .with_debug(true);

        let mut scraper = OpenCorporatesScraper::new(config);
        let path = scraper.execute().await.expect("Harvest failed");

        let numbers = crate::numbers::read_numbers(&path).expect("Failed to read numbers");
        println!("\n=== Harvest Result ===");
        println!("Numbers: {}", numbers.len());
        for n in numbers.iter().take(10) {
            println!("  - {}", n);
        }
        assert!(!numbers.is_empty());
    }
}
