//! Windows driver printers
//!
//! Uses the Win32 spooler API to send RAW data through installed printer
//! drivers, and EnumPrintersW to list them.

use super::{PrinterSession, Transport};
use crate::discovery::Discovery;
use crate::error::{DrawerError, DrawerResult};
use crate::listing::{NativePrinter, NativeStatus, RawListing};
use core::ffi::c_void;
use std::io;
use tracing::debug;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, EnumPrintersW, GetDefaultPrinterW,
    OpenPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_HANDLE, PRINTER_INFO_2W,
    StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{PCWSTR, PWSTR};

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Win32 spooler transport
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsTransport;

impl Transport for WindowsTransport {
    fn open(&self, printer: &str) -> io::Result<Box<dyn PrinterSession>> {
        let mut handle = PRINTER_HANDLE::default();
        let name_w = to_wide(printer);

        unsafe { OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None) }
            .map_err(io::Error::other)?;

        Ok(Box::new(WindowsSession {
            handle,
            doc_started: false,
            page_started: false,
        }))
    }
}

struct WindowsSession {
    handle: PRINTER_HANDLE,
    doc_started: bool,
    page_started: bool,
}

// The handle is only ever used from the thread that currently owns the session.
unsafe impl Send for WindowsSession {}

impl WindowsSession {
    fn end_page(&mut self) -> bool {
        if !self.page_started {
            return true;
        }
        self.page_started = false;
        unsafe { EndPagePrinter(self.handle) }.as_bool()
    }

    fn end_doc(&mut self) -> bool {
        if !self.doc_started {
            return true;
        }
        self.doc_started = false;
        unsafe { EndDocPrinter(self.handle) }.as_bool()
    }
}

impl PrinterSession for WindowsSession {
    fn start_document(&mut self, doc_name: &str) -> io::Result<()> {
        let doc_name_w = to_wide(doc_name);
        let datatype_w = to_wide("RAW");
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        if unsafe { StartDocPrinterW(self.handle, 1, &doc_info as *const DOC_INFO_1W) } == 0 {
            return Err(io::Error::last_os_error());
        }
        self.doc_started = true;
        Ok(())
    }

    fn start_page(&mut self) -> io::Result<()> {
        if !unsafe { StartPagePrinter(self.handle) }.as_bool() {
            return Err(io::Error::last_os_error());
        }
        self.page_started = true;
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut written: u32 = 0;
        let ok = unsafe {
            WritePrinter(
                self.handle,
                data.as_ptr() as *const c_void,
                data.len() as u32,
                &mut written,
            )
        };
        if !ok.as_bool() {
            return Err(io::Error::last_os_error());
        }
        Ok(written as usize)
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        if !self.end_page() {
            return Err(io::Error::last_os_error());
        }
        if !self.end_doc() {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for WindowsSession {
    fn drop(&mut self) {
        let _ = self.end_page();
        let _ = self.end_doc();
        let _ = unsafe { ClosePrinter(self.handle) };
    }
}

/// Native printer enumeration (EnumPrintersW level 2)
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Discovery;

impl Win32Discovery {
    /// Get the default printer name
    pub fn default_printer() -> Option<String> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);

            if needed == 0 {
                return None;
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            if !GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed).as_bool() {
                return None;
            }

            PWSTR(buf.as_mut_ptr()).to_string().ok()
        }
    }
}

impl Discovery for Win32Discovery {
    fn list(&self) -> DrawerResult<RawListing> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let default_name = Self::default_printer();

        unsafe {
            let mut needed: u32 = 0;
            let mut returned: u32 = 0;

            let _ = EnumPrintersW(flags, None, 2, None, &mut needed, &mut returned);

            if needed == 0 {
                return Ok(RawListing::Native(Vec::new()));
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                2,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|e| DrawerError::Discovery(format!("EnumPrintersW failed: {}", e)))?;

            let ptr = buf.as_ptr() as *const PRINTER_INFO_2W;
            let slice = std::slice::from_raw_parts(ptr, returned as usize);

            let printers = slice
                .iter()
                .map(|info| {
                    let name = if info.pPrinterName.is_null() {
                        None
                    } else {
                        PWSTR(info.pPrinterName.0).to_string().ok()
                    };
                    let is_default = name.is_some() && name == default_name;
                    NativePrinter {
                        name,
                        is_default,
                        status: NativeStatus::Win32(info.Status),
                    }
                })
                .collect::<Vec<_>>();

            debug!(count = printers.len(), "enumerated printers");
            Ok(RawListing::Native(printers))
        }
    }
}
