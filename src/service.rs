use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::HarvestConfig;
use crate::error::ScraperError;
use crate::kbo::KboConfig;
use crate::pipeline::{self, ExtractOutcome};

/// One extract run: harvest numbers (or reuse a numbers file), look
/// them up and write the workbook.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub email: String,
    pub password: String,
    /// Skip the harvest and use this numbers file instead.
    pub numbers_file: Option<PathBuf>,
    /// Where a fresh harvest writes its numbers.
    pub numbers_path: PathBuf,
    pub output: PathBuf,
    pub headless: bool,
    pub debug: bool,
    pub max_pages: Option<u32>,
}

impl ExtractRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            numbers_file: None,
            numbers_path: PathBuf::from("company_numbers.txt"),
            output: PathBuf::from("company_functions.xlsx"),
            headless: true,
            debug: false,
            max_pages: None,
        }
    }

    pub fn with_numbers_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.numbers_file = Some(path.into());
        self
    }

    pub fn with_numbers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.numbers_path = path.into();
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl From<&ExtractRequest> for HarvestConfig {
    fn from(req: &ExtractRequest) -> Self {
        HarvestConfig::new(req.email.clone(), req.password.clone())
            .with_numbers_path(req.numbers_path.clone())
            .with_max_pages(req.max_pages)
            .with_headless(req.headless)
            .with_debug(req.debug)
    }
}

impl From<&ExtractRequest> for KboConfig {
    fn from(req: &ExtractRequest) -> Self {
        KboConfig::new()
            .with_headless(req.headless)
            .with_debug(req.debug)
    }
}

/// Extract pipeline behind a tower::Service, for embedding in servers
/// or wrapping with middleware.
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // Room for rate limits and shared browser state later
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ExtractRequest> for ScraperService {
    type Response = ExtractOutcome;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ExtractRequest) -> Self::Future {
        info!("Extract request received: output={:?}", req.output);

        Box::pin(async move {
            // A numbers file makes the harvest, and its credentials,
            // unnecessary.
            let harvest = if req.numbers_file.is_some() {
                None
            } else {
                Some(HarvestConfig::from(&req))
            };
            let kbo = KboConfig::from(&req);

            let outcome =
                pipeline::run_extract(harvest, req.numbers_file.clone(), kbo, req.output.clone())
                    .await?;

            info!(
                "Extract completed: {} rows in {:?}",
                outcome.rows, outcome.workbook
            );
            Ok(outcome)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_request_builder() {
        let req = ExtractRequest::new("user@example.com", "pass")
            .with_numbers_file("/tmp/numbers.txt")
            .with_output("/tmp/out.xlsx")
            .with_headless(false)
            .with_debug(true)
            .with_max_pages(Some(2));

        assert_eq!(req.email, "user@example.com");
        assert_eq!(req.numbers_file, Some(PathBuf::from("/tmp/numbers.txt")));
        assert_eq!(req.output, PathBuf::from("/tmp/out.xlsx"));
        assert!(!req.headless);
        assert!(req.debug);
        assert_eq!(req.max_pages, Some(2));
    }

    #[test]
    fn test_extract_request_to_configs() {
        let req = ExtractRequest::new("user@example.com", "pass")
            .with_numbers_path("/tmp/numbers.txt")
            .with_max_pages(Some(3))
            .with_headless(false);

        let harvest = HarvestConfig::from(&req);
        assert_eq!(harvest.email, "user@example.com");
        assert_eq!(harvest.numbers_path, PathBuf::from("/tmp/numbers.txt"));
        assert_eq!(harvest.max_pages, Some(3));
        assert!(!harvest.headless);

        let kbo = KboConfig::from(&req);
        assert!(!kbo.headless);
        assert!(!kbo.debug);
    }
}
