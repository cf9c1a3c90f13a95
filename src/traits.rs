use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ScraperError;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Start the browser.
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// Authenticate against the target site.
    async fn login(&mut self) -> Result<(), ScraperError>;

    /// Collect enterprise numbers and write them to a file.
    async fn harvest(&mut self) -> Result<PathBuf, ScraperError>;

    /// Release browser resources.
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// Run the full flow (initialize → login → harvest → close).
    async fn execute(&mut self) -> Result<PathBuf, ScraperError> {
        self.initialize().await?;
        self.login().await?;
        let path = self.harvest().await?;
        self.close().await?;
        Ok(path)
    }
}
