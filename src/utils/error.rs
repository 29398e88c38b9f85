use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("pdftotext failed: {message}")]
    PdfExtract { message: String },

    #[error("Structural parse failure: {message}")]
    Parsing { message: String },

    #[error("No parser available for canteen '{0}'")]
    UnsupportedCanteen(String),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl MenuError {
    pub fn parsing(message: impl Into<String>) -> Self {
        MenuError::Parsing {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
