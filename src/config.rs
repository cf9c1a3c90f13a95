use std::path::PathBuf;

/// Settings for the OpenCorporates harvest step.
///
/// Credentials are required for the search result pages; the rest has
/// working defaults.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub email: String,
    pub password: String,
    /// Where the collected enterprise numbers are written, one per line.
    pub numbers_path: PathBuf,
    /// Stop after this many result pages. `None` walks every page.
    pub max_pages: Option<u32>,
    pub headless: bool,
    pub debug: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            numbers_path: PathBuf::from("company_numbers.txt"),
            max_pages: None,
            headless: true,
            debug: false,
        }
    }
}

impl HarvestConfig {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn with_numbers_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.numbers_path = path.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert!(config.email.is_empty());
        assert!(config.password.is_empty());
        assert_eq!(config.numbers_path, PathBuf::from("company_numbers.txt"));
        assert_eq!(config.max_pages, None);
        assert!(config.headless);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_chain() {
        let config = HarvestConfig::new("user@example.com", "secret")
            .with_numbers_path("/tmp/numbers.txt")
            .with_max_pages(Some(2))
            .with_headless(false)
            .with_debug(true);
        assert_eq!(config.email, "user@example.com");
        assert_eq!(config.password, "secret");
        assert_eq!(config.numbers_path, PathBuf::from("/tmp/numbers.txt"));
        assert_eq!(config.max_pages, Some(2));
        assert!(!config.headless);
        assert!(config.debug);
    }
}
