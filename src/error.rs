use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {location}: HTTP status {status}")]
    Fetch { location: String, status: u16 },

    #[error("Unknown record field: {0}")]
    UnknownField(String),

    #[error("No dataset with identifier: {0}")]
    UnknownDataset(String),

    #[error("Missing chart input: {0}")]
    MissingInput(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
