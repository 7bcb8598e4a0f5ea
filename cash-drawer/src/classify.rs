//! Virtual printer detection
//!
//! Virtual printers accept the drawer-kick bytes and report success without
//! any hardware attached, so they are refused before a handle is opened.

/// Lower-case name fragments of known virtual printers
const VIRTUAL_PRINTER_FRAGMENTS: &[&str] = &[
    "microsoft print to pdf",
    "microsoft xps document writer",
    "onenote",
    "fax",
    "adobe pdf",
    "cute pdf",
    "cutepdf",
    "bullzip pdf",
    "foxit pdf",
    "pdf24",
    "dopdf",
    "pdfcreator",
    "document writer",
    "print to pdf",
    "xps",
];

/// Check if a printer name belongs to a virtual (non-physical) printer
///
/// Case-insensitive substring match against the full name.
pub fn is_virtual(name: &str) -> bool {
    let lower = name.to_lowercase();
    VIRTUAL_PRINTER_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}
