//! Error types for KTON decoding.
//!
//! Only [`KtonError::SourceUnavailable`], [`KtonError::Io`] and
//! [`KtonError::InvalidConfig`] ever reach the caller of a scan. The
//! per-line variants are produced by the decoder and cause the offending
//! line to be skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KtonError>;

/// Errors raised while opening, decoding or batching a KTON stream.
#[derive(Debug, Error)]
pub enum KtonError {
    /// The input stream could not be opened.
    #[error("could not open '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A field slice would read past the end of the line.
    #[error("field at {offset}+{len} exceeds line length {line_len}")]
    OutOfRange {
        offset: usize,
        len: usize,
        line_len: usize,
    },

    /// A `YYMMDD` field does not name a real calendar date.
    #[error("invalid date '{digits}'")]
    InvalidDate { digits: String },

    /// A numeric field does not fit its target integer width.
    #[error("numeric field '{digits}' overflows {target}")]
    NumericOverflow { digits: String, target: &'static str },

    /// A scan setting is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Reading from an already open source failed.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow refused to assemble a batch.
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

impl KtonError {
    /// True for failures that only affect a single line.
    ///
    /// The batch producer skips such lines and keeps scanning.
    pub fn is_line_local(&self) -> bool {
        matches!(
            self,
            KtonError::OutOfRange { .. }
                | KtonError::InvalidDate { .. }
                | KtonError::NumericOverflow { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_local_classification() {
        let short = KtonError::OutOfRange {
            offset: 187,
            len: 1,
            line_len: 40,
        };
        assert!(short.is_line_local());
        assert!(
            KtonError::InvalidDate {
                digits: "231340".to_string()
            }
            .is_line_local()
        );

        let io = KtonError::Io(std::io::Error::other("disk gone"));
        assert!(!io.is_line_local());
        assert!(!KtonError::InvalidConfig("batch size".to_string()).is_line_local());
    }

    #[test]
    fn test_source_unavailable_message() {
        let err = KtonError::SourceUnavailable {
            path: PathBuf::from("missing.kton"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.kton"));
        assert!(msg.contains("not found"));
    }
}
