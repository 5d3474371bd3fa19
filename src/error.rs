use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoldWatchError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Price source error: {0}")]
    Price(#[from] PriceError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("No gold price found on page")]
    NotFound,

    #[error("Failed to parse price '{text}': {source}")]
    Parse {
        text: String,
        source: std::num::ParseFloatError,
    },

    #[error("Price is not a finite number: {0}")]
    NotFinite(f64),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
