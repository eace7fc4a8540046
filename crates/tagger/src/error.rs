use thiserror::Error;

/// Result type for tagger operations
pub type Result<T> = std::result::Result<T, TaggerError>;

/// Errors that abort tagging or assembly of a single report
#[derive(Error, Debug)]
pub enum TaggerError {
    /// Vocabulary input or tagger configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// The table of contents could not be delimited
    #[error(
        "Table of contents boundary not found (header found: {header_found}, lines scanned: {lines_scanned})"
    )]
    BoundaryNotFound {
        header_found: bool,
        lines_scanned: usize,
    },

    /// The first-chapter marker appeared more often than a report allows
    #[error("First chapter marker repeated at line {line} ({occurrences} occurrences)")]
    RuntimeFault { line: usize, occurrences: usize },

    /// A chapter ordinal word outside the ordinal table
    #[error("Unknown chapter ordinal '{word}' at line {line}")]
    UnknownOrdinal { word: String, line: usize },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaggerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown ordinal error
    pub fn unknown_ordinal(word: impl Into<String>, line: usize) -> Self {
        Self::UnknownOrdinal {
            word: word.into(),
            line,
        }
    }

    /// Whether the error aborts only the report that raised it.
    ///
    /// Configuration and IO failures usually affect every report that shares
    /// the same inputs; the rest are specific to one document.
    #[must_use]
    pub const fn is_report_local(&self) -> bool {
        matches!(
            self,
            Self::BoundaryNotFound { .. } | Self::RuntimeFault { .. } | Self::UnknownOrdinal { .. }
        )
    }
}
