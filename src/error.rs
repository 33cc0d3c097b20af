use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Log file initialization failed: {0}")]
    LogFile(#[from] tracing_appender::rolling::InitError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Join key '{key}' has incompatible types: {left} vs {right}")]
    KeyTypeMismatch {
        key: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("Category schema mismatch at row {row}: {message}")]
    SchemaMismatch { row: usize, message: String },

    #[error("Invalid category value at row {row}: '{token}'")]
    InvalidCategoryValue { row: usize, token: String },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
