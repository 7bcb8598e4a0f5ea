//! Error types for the cash drawer library
//!
//! Every failure is one of the [`DrawerError`] variants below, and every
//! variant resolves to exactly one [`ErrorCode`]. Callers never see a raw
//! error: the facade converts through [`map_failure`] into an [`OpenResult`].

use crate::codes::ErrorCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Drawer error types
#[derive(Debug, Error)]
pub enum DrawerError {
    /// Drawer options out of range or malformed
    #[error("Invalid options: {0}")]
    InvalidArgument(String),

    /// Printer name missing, empty, too long or not a string
    #[error("{0}")]
    InvalidName(String),

    /// Target classified as a virtual printer
    #[error(
        "Cannot open cash drawer on virtual printer '{0}'. Please use a physical receipt printer."
    )]
    VirtualBlocked(String),

    /// Printer handle / destination could not be opened
    #[error("Failed to open printer '{printer}': {source}")]
    Open {
        printer: String,
        #[source]
        source: std::io::Error,
    },

    /// Print job could not be started
    #[error("Failed to start print job: {0}")]
    StartDoc(#[source] std::io::Error),

    /// Page could not be started
    #[error("Failed to start page: {0}")]
    StartPage(#[source] std::io::Error),

    /// Write call failed
    #[error("Failed to write to printer: {0}")]
    Write(#[source] std::io::Error),

    /// Printer accepted fewer bytes than sent
    #[error("Not all bytes were written to printer. Expected: {expected}, Written: {written}")]
    IncompleteWrite { expected: usize, written: usize },

    /// Spooler failed to close out the job after the bytes were written
    #[error("Print job was not completed: {0}")]
    EndDoc(#[source] std::io::Error),

    /// Blocking work did not finish in time
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// Discovery collaborator failed
    #[error("Printer discovery failed: {0}")]
    Discovery(String),

    /// IO error outside a named transport stage
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

impl DrawerError {
    /// Map this failure onto the stable code table
    pub fn code(&self) -> ErrorCode {
        match self {
            DrawerError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            DrawerError::InvalidName(_) => ErrorCode::InvalidName,
            DrawerError::VirtualBlocked(_) => ErrorCode::VirtualBlocked,
            DrawerError::Open { .. } => ErrorCode::OpenError,
            DrawerError::StartDoc(_) | DrawerError::EndDoc(_) => ErrorCode::StartDocError,
            DrawerError::StartPage(_) => ErrorCode::StartPageError,
            DrawerError::Write(_) => ErrorCode::WriteError,
            DrawerError::IncompleteWrite { .. } => ErrorCode::IncompleteWrite,
            DrawerError::Timeout { .. }
            | DrawerError::Discovery(_)
            | DrawerError::Io(_)
            | DrawerError::Other(_) => ErrorCode::OtherError,
        }
    }
}

/// Result type for drawer operations
pub type DrawerResult<T> = Result<T, DrawerError>;

/// Translate any failure into its code and a caller-facing message.
///
/// The failure's own text is kept verbatim; an empty one is replaced by the
/// code's default message.
pub fn map_failure(err: &DrawerError) -> (ErrorCode, String) {
    let code = err.code();
    let message = err.to_string();
    if message.trim().is_empty() {
        (code, code.message().to_string())
    } else {
        (code, message)
    }
}

/// Outcome of one drawer-kick request
///
/// Only constructible through [`OpenResult::ok`] and `From<DrawerError>`, so
/// `success` always agrees with `error_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenResult {
    success: bool,
    error_code: ErrorCode,
    error_message: String,
}

impl OpenResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error_code: ErrorCode::Success,
            error_message: String::new(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

impl From<DrawerError> for OpenResult {
    fn from(err: DrawerError) -> Self {
        let (error_code, error_message) = map_failure(&err);
        Self {
            success: false,
            error_code,
            error_message,
        }
    }
}

impl From<DrawerResult<()>> for OpenResult {
    fn from(outcome: DrawerResult<()>) -> Self {
        match outcome {
            Ok(()) => OpenResult::ok(),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn io_err() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "no such printer")
    }

    #[test]
    fn test_stage_codes() {
        let open = DrawerError::Open {
            printer: "TM-T20".into(),
            source: io_err(),
        };
        assert_eq!(open.code(), ErrorCode::OpenError);
        assert_eq!(DrawerError::StartDoc(io_err()).code(), ErrorCode::StartDocError);
        assert_eq!(DrawerError::EndDoc(io_err()).code(), ErrorCode::StartDocError);
        assert_eq!(DrawerError::StartPage(io_err()).code(), ErrorCode::StartPageError);
        assert_eq!(DrawerError::Write(io_err()).code(), ErrorCode::WriteError);
        assert_eq!(
            DrawerError::IncompleteWrite {
                expected: 5,
                written: 3
            }
            .code(),
            ErrorCode::IncompleteWrite
        );
    }

    #[test]
    fn test_unclassified_failures_are_other() {
        let timeout = DrawerError::Timeout {
            operation: "Drawer kick on 'TM-T20'".into(),
            after: Duration::from_secs(1),
        };
        assert_eq!(timeout.code(), ErrorCode::OtherError);
        assert_eq!(timeout.to_string(), "Drawer kick on 'TM-T20' timed out after 1s");
        assert_eq!(DrawerError::Io(io_err()).code(), ErrorCode::OtherError);
        assert_eq!(DrawerError::Other("boom".into()).code(), ErrorCode::OtherError);
        assert_eq!(DrawerError::Discovery("x".into()).code(), ErrorCode::OtherError);
    }

    #[test]
    fn test_message_preserved() {
        let err = DrawerError::Open {
            printer: "TM-T20".into(),
            source: io_err(),
        };
        let (code, msg) = map_failure(&err);
        assert_eq!(code, ErrorCode::OpenError);
        assert_eq!(msg, "Failed to open printer 'TM-T20': no such printer");
    }

    #[test]
    fn test_empty_message_gets_default() {
        let (code, msg) = map_failure(&DrawerError::Other(String::new()));
        assert_eq!(code, ErrorCode::OtherError);
        assert_eq!(msg, "Failed to open cash drawer");
    }

    #[test]
    fn test_open_result_invariant() {
        let ok = OpenResult::ok();
        assert!(ok.success());
        assert_eq!(ok.error_code(), ErrorCode::Success);
        assert!(ok.error_message().is_empty());

        let failed = OpenResult::from(DrawerError::VirtualBlocked("Fax".into()));
        assert!(!failed.success());
        assert_eq!(failed.error_code(), ErrorCode::VirtualBlocked);
        assert!(failed.error_message().contains("'Fax'"));
    }

    #[test]
    fn test_open_result_json_shape() {
        let failed = OpenResult::from(DrawerError::IncompleteWrite {
            expected: 5,
            written: 2,
        });
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["errorCode"], 1005);
        assert_eq!(
            value["errorMessage"],
            "Not all bytes were written to printer. Expected: 5, Written: 2"
        );
    }
}
