use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the KBO lookup step.
#[derive(Debug, Clone)]
pub struct KboConfig {
    pub headless: bool,
    pub debug: bool,
    /// Pause between lookups so the registry is not hammered.
    pub pause: Duration,
}

impl Default for KboConfig {
    fn default() -> Self {
        Self {
            headless: true,
            debug: false,
            pause: Duration::from_secs(3),
        }
    }
}

impl KboConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

/// Raw extraction payload returned by the in-page script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyExtract {
    /// Whether the page showed a company record at all.
    pub found: bool,
    #[serde(rename = "enterpriseNumber")]
    pub enterprise_number: String,
    pub name: String,
    pub email: String,
    pub functions: Vec<FunctionEntry>,
}

/// One row of the functions table, still unparsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionEntry {
    pub title: String,
    pub holder: String,
}

/// One officer/function row as it lands in the workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionRecord {
    pub company_number: String,
    pub company_name: String,
    pub email: String,
    pub function_title: String,
    pub first_name: String,
    pub last_name: String,
    /// Enterprise number of the holder when the function is held by a
    /// company rather than a person.
    pub person_company_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KboConfig::default();
        assert!(config.headless);
        assert!(!config.debug);
        assert_eq!(config.pause, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_chain() {
        let config = KboConfig::new()
            .with_headless(false)
            .with_debug(true)
            .with_pause(Duration::from_secs(1));
        assert!(!config.headless);
        assert!(config.debug);
        assert_eq!(config.pause, Duration::from_secs(1));
    }

    #[test]
    fn test_extract_deserializes_from_page_payload() {
        let json = r#"{
            "found": true,
            "enterpriseNumber": "0403.200.393",
            "name": "Acme NV",
            "email": "info@acme.be",
            "functions": [
                {"title": "Bestuurder", "holder": "Peeters , Jan"}
            ]
        }"#;

        let extract: CompanyExtract = serde_json::from_str(json).unwrap();
        assert!(extract.found);
        assert_eq!(extract.enterprise_number, "0403.200.393");
        assert_eq!(extract.name, "Acme NV");
        assert_eq!(extract.email, "info@acme.be");
        assert_eq!(extract.functions.len(), 1);
        assert_eq!(extract.functions[0].title, "Bestuurder");
    }

    #[test]
    fn test_extract_tolerates_missing_fields() {
        let extract: CompanyExtract = serde_json::from_str(r#"{"found": false}"#).unwrap();
        assert!(!extract.found);
        assert!(extract.enterprise_number.is_empty());
        assert!(extract.functions.is_empty());
    }
}
