use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Rate limited. Try again later.")]
    RateLimited,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Request to {url} failed with status {status}")]
    Status { status: StatusCode, url: String },
}

pub type Result<T> = std::result::Result<T, Error>;
