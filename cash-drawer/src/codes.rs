//! Stable numeric result codes
//!
//! Callers persist and compare these by number, so a value is never reused
//! and never renumbered:
//! - 0: success
//! - 1000..=1008: drawer-kick failures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code returned with every drawer-kick attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    /// Operation completed successfully
    Success = 0,
    /// Malformed drawer options
    InvalidArgument = 1000,
    /// Printer could not be opened
    OpenError = 1001,
    /// Print job could not be started or completed
    StartDocError = 1002,
    /// Page could not be started
    StartPageError = 1003,
    /// Writing the command failed
    WriteError = 1004,
    /// Fewer bytes accepted than sent
    IncompleteWrite = 1005,
    /// Printer name missing, empty or not a string
    InvalidName = 1006,
    /// Anything not covered by a more specific code
    OtherError = 1007,
    /// Target is a virtual printer
    VirtualBlocked = 1008,
}

impl ErrorCode {
    /// Every code, in numeric order
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::Success,
        ErrorCode::InvalidArgument,
        ErrorCode::OpenError,
        ErrorCode::StartDocError,
        ErrorCode::StartPageError,
        ErrorCode::WriteError,
        ErrorCode::IncompleteWrite,
        ErrorCode::InvalidName,
        ErrorCode::OtherError,
        ErrorCode::VirtualBlocked,
    ];

    /// Get the numeric value
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Stable identifier, as exported to scripting hosts
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::Success => "PRINTER_SUCCESS",
            ErrorCode::InvalidArgument => "PRINTER_INVALID_ARGUMENT",
            ErrorCode::OpenError => "PRINTER_OPEN_ERROR",
            ErrorCode::StartDocError => "PRINTER_START_DOC_ERROR",
            ErrorCode::StartPageError => "PRINTER_START_PAGE_ERROR",
            ErrorCode::WriteError => "PRINTER_WRITE_ERROR",
            ErrorCode::IncompleteWrite => "PRINTER_INCOMPLETE_WRITE",
            ErrorCode::InvalidName => "PRINTER_INVALID_NAME",
            ErrorCode::OtherError => "PRINTER_OTHER_ERROR",
            ErrorCode::VirtualBlocked => "PRINTER_VIRTUAL_BLOCKED",
        }
    }

    /// Default message, used when a failure carries no text of its own
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "",
            ErrorCode::InvalidArgument => "Invalid drawer options",
            ErrorCode::OpenError => "Failed to open printer",
            ErrorCode::StartDocError => "Failed to start print job",
            ErrorCode::StartPageError => "Failed to start page",
            ErrorCode::WriteError => "Failed to write to printer",
            ErrorCode::IncompleteWrite => "Not all bytes were written to printer",
            ErrorCode::InvalidName => "printerName must be a non-empty string",
            ErrorCode::OtherError => "Failed to open cash drawer",
            ErrorCode::VirtualBlocked => "Cannot open cash drawer on a virtual printer",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1000 => Ok(ErrorCode::InvalidArgument),
            1001 => Ok(ErrorCode::OpenError),
            1002 => Ok(ErrorCode::StartDocError),
            1003 => Ok(ErrorCode::StartPageError),
            1004 => Ok(ErrorCode::WriteError),
            1005 => Ok(ErrorCode::IncompleteWrite),
            1006 => Ok(ErrorCode::InvalidName),
            1007 => Ok(ErrorCode::OtherError),
            1008 => Ok(ErrorCode::VirtualBlocked),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::InvalidArgument.code(), 1000);
        assert_eq!(ErrorCode::OpenError.code(), 1001);
        assert_eq!(ErrorCode::StartDocError.code(), 1002);
        assert_eq!(ErrorCode::StartPageError.code(), 1003);
        assert_eq!(ErrorCode::WriteError.code(), 1004);
        assert_eq!(ErrorCode::IncompleteWrite.code(), 1005);
        assert_eq!(ErrorCode::InvalidName.code(), 1006);
        assert_eq!(ErrorCode::OtherError.code(), 1007);
        assert_eq!(ErrorCode::VirtualBlocked.code(), 1008);
    }

    #[test]
    fn test_try_from_covers_all() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(1009), Err(InvalidErrorCode(1009)));
        assert_eq!(ErrorCode::try_from(1), Err(InvalidErrorCode(1)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::VirtualBlocked).unwrap();
        assert_eq!(json, "1008");

        let code: ErrorCode = serde_json::from_str("1005").unwrap();
        assert_eq!(code, ErrorCode::IncompleteWrite);

        assert!(serde_json::from_str::<ErrorCode>("42").is_err());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = ErrorCode::ALL.iter().map(|c| c.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ErrorCode::ALL.len());
    }
}
