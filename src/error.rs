//! Error type shared by the quiz core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    /// A section, log, sheet or source file that does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A source that exists but yields no words
    #[error("no words found: {0}")]
    Empty(String),

    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl QuizError {
    /// True for the "resource missing" class the engine degrades on
    pub fn is_missing(&self) -> bool {
        match self {
            QuizError::NotFound(_) => true,
            QuizError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;
