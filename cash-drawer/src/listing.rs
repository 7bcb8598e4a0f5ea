//! Printer listing parser
//!
//! Turns whatever the discovery backend produced into [`PrinterInfo`]
//! records. Three dialects are understood:
//! - whitespace-column tables with a header line (`wmic printer get ...`)
//! - `lpstat -p -d` output from CUPS
//! - native records from the Win32 / IPP enumeration APIs
//!
//! Parsing is best-effort per row: a short or odd row still yields a record
//! with `None` / [`PrinterStatus::Unknown`] fallbacks, never an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Column separator: a tab, or two or more spaces
static COLUMN_SEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]*\t\s*|\s{2,}").expect("column separator regex"));

// Win32 PRINTER_STATUS_* bits
const WIN32_STATUS_PAUSED: u32 = 0x0000_0001;
const WIN32_STATUS_OFFLINE: u32 = 0x0000_0080;

/// Normalised printer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrinterStatus {
    Ok,
    Idle,
    Offline,
    Unknown,
}

impl PrinterStatus {
    /// Look up a textual status token (case-insensitive)
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ok" | "normal" | "ready" => PrinterStatus::Ok,
            "idle" => PrinterStatus::Idle,
            "offline" => PrinterStatus::Offline,
            _ => PrinterStatus::Unknown,
        }
    }

    /// Map a Win32 `PRINTER_INFO_2::Status` bit set
    pub fn from_win32(status: u32) -> Self {
        if status == 0 {
            PrinterStatus::Ok
        } else if status & WIN32_STATUS_OFFLINE != 0 {
            PrinterStatus::Offline
        } else if status & WIN32_STATUS_PAUSED != 0 {
            PrinterStatus::Idle
        } else {
            PrinterStatus::Unknown
        }
    }

    /// Map an IPP `printer-state` value (3 idle, 4 processing, 5 stopped)
    pub fn from_ipp_state(state: Option<&str>) -> Self {
        let Some(state) = state else {
            return PrinterStatus::Ok;
        };
        match state.trim().parse::<i32>() {
            Ok(3) => PrinterStatus::Idle,
            Ok(4) => PrinterStatus::Ok,
            Ok(5) => PrinterStatus::Offline,
            _ => PrinterStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterStatus::Ok => "OK",
            PrinterStatus::Idle => "IDLE",
            PrinterStatus::Offline => "OFFLINE",
            PrinterStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One installed printer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub name: Option<String>,
    #[serde(rename = "default")]
    pub is_default: bool,
    pub status: PrinterStatus,
}

/// Status as reported by a native enumeration API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeStatus {
    /// `PRINTER_INFO_2::Status`
    Win32(u32),
    /// CUPS `printer-state` option, if present
    Ipp(Option<String>),
}

/// Record from a native enumeration API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePrinter {
    pub name: Option<String>,
    pub is_default: bool,
    pub status: NativeStatus,
}

/// Raw output of a discovery backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawListing {
    /// Header line plus whitespace-separated columns
    Table(String),
    /// `lpstat -p -d` output
    Lpstat(String),
    /// Already-structured records
    Native(Vec<NativePrinter>),
}

/// Normalise a raw listing, preserving row order
pub fn parse(listing: &RawListing) -> Vec<PrinterInfo> {
    match listing {
        RawListing::Table(text) => parse_table(text),
        RawListing::Lpstat(text) => parse_lpstat(text),
        RawListing::Native(records) => records.iter().map(normalize_native).collect(),
    }
}

fn normalize_native(record: &NativePrinter) -> PrinterInfo {
    let status = match &record.status {
        NativeStatus::Win32(bits) => PrinterStatus::from_win32(*bits),
        NativeStatus::Ipp(state) => PrinterStatus::from_ipp_state(state.as_deref()),
    };
    PrinterInfo {
        name: record.name.clone(),
        is_default: record.is_default,
        status,
    }
}

fn split_columns(line: &str) -> Vec<&str> {
    COLUMN_SEP
        .split(line)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a whitespace-column table
///
/// The first non-empty line names the columns (lower-cased). Data rows are
/// zipped positionally; missing cells are `None`, extra cells are ignored.
pub fn parse_table(text: &str) -> Vec<PrinterInfo> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_columns(header)
        .into_iter()
        .map(str::to_lowercase)
        .collect();

    lines
        .map(|line| {
            let cells = split_columns(line);
            let row: HashMap<&str, &str> = headers
                .iter()
                .map(String::as_str)
                .zip(cells)
                .collect();

            PrinterInfo {
                name: row.get("name").map(|s| s.to_string()),
                is_default: row.get("default").is_some_and(|v| *v == "TRUE"),
                status: row
                    .get("status")
                    .map(|s| PrinterStatus::from_raw(s))
                    .unwrap_or(PrinterStatus::Unknown),
            }
        })
        .collect()
}

/// Parse `lpstat -p -d` output (C locale)
pub fn parse_lpstat(text: &str) -> Vec<PrinterInfo> {
    let mut printers = Vec::new();
    let mut default_name: Option<&str> = None;

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("printer ") {
            let (name, state) = rest.split_once(' ').unwrap_or((rest, ""));
            let status = if state.contains("disabled") {
                PrinterStatus::Offline
            } else if state.starts_with("is idle") {
                PrinterStatus::Idle
            } else if state.starts_with("now printing") {
                PrinterStatus::Ok
            } else {
                PrinterStatus::Unknown
            };
            printers.push(PrinterInfo {
                name: (!name.is_empty()).then(|| name.to_string()),
                is_default: false,
                status,
            });
        } else if let Some(dest) = line.strip_prefix("system default destination:") {
            default_name = Some(dest.trim());
        }
    }

    if let Some(default_name) = default_name {
        for printer in &mut printers {
            printer.is_default = printer.name.as_deref() == Some(default_name);
        }
    }

    printers
}

/// Decode command output, honouring a byte-order mark
///
/// Windows tools often emit UTF-16LE when their output is piped.
pub fn decode_output(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    if bytes.len() >= 2 && bytes.len() % 2 == 0 && bytes[0] != 0 && bytes[1] == 0 {
        let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}
