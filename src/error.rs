use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("File '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input has no header row")]
    MissingHeader,

    #[error("Invalid validation rules: {0}")]
    InvalidRules(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// A single field that could not be turned into its declared type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{header} value '{text}' cannot be converted: {reason}")]
pub struct ConversionError {
    pub header: &'static str,
    pub text: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(header: &'static str, text: &str, reason: impl Into<String>) -> Self {
        Self {
            header,
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}
