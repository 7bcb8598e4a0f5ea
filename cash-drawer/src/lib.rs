//! # cash-drawer
//!
//! Opens a cash drawer wired to a receipt printer, and lists the printers
//! installed on the host so the caller can pick one.
//!
//! ## Scope
//!
//! This crate decides WHAT to send and WHETHER to send it:
//! - `ESC p` drawer-kick encoding
//! - Virtual printer (PDF/XPS/Fax/OneNote) rejection
//! - Printer listing parsing and status normalisation
//! - Stable numeric result codes
//!
//! The bytes travel through a [`Transport`]:
//! - Windows driver printers (Win32 spooler)
//! - CUPS queues (`lp`)
//! - Network printers (TCP port 9100)
//!
//! ## Example
//!
//! ```ignore
//! use cash_drawer::{CashDrawer, DrawerOptions, ErrorCode};
//!
//! let drawer = CashDrawer::system();
//!
//! for printer in drawer.get_available_printers().await {
//!     println!("{:?} default={} status={}", printer.name, printer.is_default, printer.status);
//! }
//!
//! let result = drawer
//!     .open_cash_drawer("EPSON TM-T20III Receipt", Some(DrawerOptions::new(0, 50, 250)))
//!     .await;
//! if result.error_code() == ErrorCode::VirtualBlocked {
//!     // pick another printer
//! }
//! ```

mod classify;
mod codes;
mod config;
mod discovery;
mod drawer;
mod error;
mod escpos;
mod listing;
mod printer;

// Re-exports
pub use classify::is_virtual;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use config::Config;
pub use discovery::{CommandDiscovery, Discovery, LpstatDiscovery};
pub use drawer::{CashDrawer, MAX_PRINTER_NAME_LENGTH};
pub use error::{DrawerError, DrawerResult, OpenResult, map_failure};
pub use escpos::{DRAWER_KICK_LEN, DrawerKick, DrawerOptions, DrawerPin, encode};
pub use listing::{
    NativePrinter, NativeStatus, PrinterInfo, PrinterStatus, RawListing, decode_output, parse,
    parse_lpstat, parse_table,
};
pub use printer::{DEFAULT_RAW_PORT, NetworkTransport, PrinterSession, Transport, send_raw};

#[cfg(any(windows, unix))]
pub use drawer::{get_available_printers, open_cash_drawer};

#[cfg(unix)]
pub use printer::CupsTransport;

#[cfg(windows)]
pub use printer::{Win32Discovery, WindowsTransport};
