use thiserror::Error;

/// Errors surfaced by the map engine and its data client.
///
/// Malformed records are never errors; they are skipped where they are read.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid airport code: {0:?}")]
    InvalidAirportCode(String),

    #[error("Invalid config value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: String },
}

impl From<ureq::Error> for MapError {
    fn from(err: ureq::Error) -> Self {
        MapError::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
