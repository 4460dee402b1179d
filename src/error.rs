use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Address verification failed: {message}")]
    Verification { message: String },

    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, RosterError>;
