//! Shared Chromium plumbing for the OpenCorporates and KBO scrapers.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::ScraperError;

/// Network idle wait timeout in milliseconds.
const NETWORK_IDLE_TIMEOUT_MS: u64 = 30000;
/// Interval between network idle checks in milliseconds.
const NETWORK_IDLE_CHECK_INTERVAL_MS: u64 = 500;
/// Page stability wait timeout in milliseconds.
const PAGE_STABLE_TIMEOUT_MS: u64 = 10000;
/// Interval between selector polls in milliseconds.
const SELECTOR_POLL_INTERVAL_MS: u64 = 500;

/// Launch a Chromium instance with an isolated user data directory.
///
/// The executable is taken from `CHROME_PATH` or `CHROMIUM_PATH`, falling
/// back to `chromium` on the PATH.
pub async fn launch(headless: bool, debug: bool) -> Result<Browser, ScraperError> {
    info!("Launching browser...");

    // Unique profile per run so parallel runs do not fight over the lock
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let user_data_dir = std::env::temp_dir().join(format!("kbo-scraper-{}", unique_id));

    let chrome_path = std::env::var("CHROME_PATH")
        .or_else(|_| std::env::var("CHROMIUM_PATH"))
        .unwrap_or_else(|_| "chromium".to_string());

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .user_data_dir(&user_data_dir)
        .window_size(1280, 800);

    if headless {
        builder = builder.arg("--headless=new");
    } else {
        builder = builder.with_head();
    }

    builder = builder
        .no_sandbox()
        .request_timeout(Duration::from_secs(60))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu");

    if debug {
        builder = builder.arg("--enable-logging=stderr").arg("--v=1");
    }

    let browser_config = builder
        .build()
        .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            debug!("Browser event: {:?}", event);
        }
    });

    info!("Browser launched");
    Ok(browser)
}

/// Poll until `selector` matches an element, or fail with a timeout.
pub async fn wait_for_selector(
    page: &Page,
    selector: &str,
    timeout: Duration,
) -> Result<(), ScraperError> {
    let start = std::time::Instant::now();
    let script = format!(
        "document.querySelector('{}') !== null",
        js_escape(selector)
    );

    let mut iteration = 0u32;
    while start.elapsed() < timeout {
        match page.evaluate(script.as_str()).await {
            Ok(result) => {
                if result.into_value::<bool>().unwrap_or(false) {
                    debug!("Selector '{}' present after {:?}", selector, start.elapsed());
                    return Ok(());
                }
            }
            Err(e) => {
                debug!("Selector check error for '{}': {}", selector, e);
            }
        }

        if iteration % 10 == 0 && iteration > 0 {
            info!(
                "Waiting for selector '{}'... ({:?} elapsed)",
                selector,
                start.elapsed()
            );
        }
        iteration += 1;
        sleep(Duration::from_millis(SELECTOR_POLL_INTERVAL_MS)).await;
    }

    Err(ScraperError::Timeout(format!(
        "selector '{}' not present after {:?}",
        selector, timeout
    )))
}

/// Wait until network requests go idle.
///
/// Uses the Performance API to watch for recently started resource
/// fetches. Logs a warning and proceeds on timeout rather than failing
/// the whole run.
pub async fn wait_request_idle(page: &Page) -> Result<(), ScraperError> {
    debug!("Waiting for network to become idle...");
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(NETWORK_IDLE_TIMEOUT_MS);

    let mut idle_count = 0;
    const REQUIRED_IDLE_CHECKS: u32 = 3;

    while start.elapsed() < timeout {
        let result = page
            .evaluate(
                r#"
                (() => {
                    const entries = performance.getEntriesByType('resource');
                    const now = performance.now();
                    const recentRequests = entries.filter(e => {
                        return (now - e.startTime) < 500 && e.duration === 0;
                    });
                    return recentRequests.length === 0;
                })()
            "#,
            )
            .await;

        match result {
            Ok(val) => {
                if val.into_value::<bool>().unwrap_or(false) {
                    idle_count += 1;
                    if idle_count >= REQUIRED_IDLE_CHECKS {
                        debug!(
                            "Network idle after {:?} ({} consecutive checks)",
                            start.elapsed(),
                            idle_count
                        );
                        return Ok(());
                    }
                } else {
                    idle_count = 0;
                }
            }
            Err(e) => {
                debug!("Network idle check error: {}", e);
                idle_count = 0;
            }
        }

        sleep(Duration::from_millis(NETWORK_IDLE_CHECK_INTERVAL_MS)).await;
    }

    warn!(
        "Network idle timeout after {:?}, proceeding anyway",
        start.elapsed()
    );
    Ok(())
}

/// Wait until the document markup stops changing.
pub async fn wait_stable(page: &Page) -> Result<(), ScraperError> {
    debug!("Waiting for page to stabilize...");
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(PAGE_STABLE_TIMEOUT_MS);

    let mut last_html_len: Option<usize> = None;
    let mut stable_count = 0;
    const REQUIRED_STABLE_CHECKS: u32 = 3;

    while start.elapsed() < timeout {
        let result = page
            .evaluate("document.documentElement.outerHTML.length")
            .await;

        match result {
            Ok(val) => {
                let current_len = val.into_value::<usize>().unwrap_or(0);

                match last_html_len {
                    Some(last) if last == current_len => {
                        stable_count += 1;
                        if stable_count >= REQUIRED_STABLE_CHECKS {
                            debug!(
                                "Page stable after {:?} ({} consecutive checks)",
                                start.elapsed(),
                                stable_count
                            );
                            return Ok(());
                        }
                    }
                    _ => {
                        stable_count = 0;
                    }
                }

                last_html_len = Some(current_len);
            }
            Err(e) => {
                debug!("Page stable check error: {}", e);
                stable_count = 0;
            }
        }

        sleep(Duration::from_millis(300)).await;
    }

    warn!(
        "Page stable timeout after {:?}, proceeding anyway",
        start.elapsed()
    );
    Ok(())
}

/// Log a full-page screenshot as a base64 data URL. Best effort.
pub async fn debug_screenshot(page: &Page, label: &str) {
    match page
        .screenshot(ScreenshotParams::builder().full_page(true).build())
        .await
    {
        Ok(screenshot) => {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("{} screenshot: data:image/png;base64,{}", label, encoded);
        }
        Err(e) => {
            debug!("{} screenshot failed: {}", label, e);
        }
    }
}

/// Escape a string for interpolation into a single-quoted JS literal.
fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
