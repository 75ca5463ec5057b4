use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    RowFormat(#[from] RowFormatError),

    #[error("{intent} failed: {source}")]
    Write {
        intent: String,
        #[source]
        source: Box<AppError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Errors that make the rest of the current phase pointless.
    pub fn is_fatal(&self) -> bool {
        match self {
            AppError::Connection(_) | AppError::Io(_) => true,
            AppError::Write { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

impl From<tokio_rusqlite::Error> for AppError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(e) => AppError::Database(e),
            other => AppError::Connection(other.to_string()),
        }
    }
}

/// Problems with the column layout itself, independent of any row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown column `{0}`")]
    UnknownField(String),

    #[error("input has {found} columns, expected {expected}")]
    ColumnCount { expected: usize, found: usize },
}

/// A single input row that cannot be turned into records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowFormatError {
    #[error("row has {found} fields, expected {expected}")]
    FieldCount { expected: usize, found: usize },

    #[error("field `{field}` at offset {offset} is not a valid {expected}: {value:?}")]
    InvalidValue {
        field: &'static str,
        offset: usize,
        expected: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
