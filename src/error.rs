use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] rquest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Credentials are present but unusable, e.g. a client secret that is not a bcrypt salt.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded (HTTP {status})")]
    RateLimit { status: u16 },

    #[error("Order fetch failed (HTTP {status}): {message}")]
    Fetch { status: u16, message: String },

    #[error("Pagination limit reached for {day}: exceeded {max_pages} pages")]
    PaginationLimit { day: String, max_pages: u32 },

    #[error("{0}")]
    Validation(String),
}

impl Error {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }
}
