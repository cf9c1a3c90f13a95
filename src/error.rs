use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("browser init error: {0}")]
    BrowserInit(String),

    #[error("navigation error: {0}")]
    Navigation(String),

    #[error("login error: {0}")]
    Login(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("javascript error: {0}")]
    JavaScript(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("json error: {0}")]
    Json(String),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("column '{0}' not found in workbook header row")]
    MissingColumn(String),

    #[error("invalid enterprise number: {0}")]
    InvalidNumber(String),

    #[error("file error: {0}")]
    FileIO(#[from] std::io::Error),
}
