//! Printer transports for sending the drawer-kick bytes
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - Windows driver printers (via Win32 spooler API)
//! - CUPS queues (via `lp`)
//!
//! All transports are blocking; the facade runs them on the blocking pool.

use crate::error::{DrawerError, DrawerResult};
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{error, info, warn};

#[cfg(unix)]
mod cups;
#[cfg(windows)]
mod win32;

#[cfg(unix)]
pub use cups::CupsTransport;
#[cfg(windows)]
pub use win32::{Win32Discovery, WindowsTransport};

/// Opens sessions on a named printer
pub trait Transport: Send + Sync {
    /// Open the printer (handle, queue or socket)
    fn open(&self, printer: &str) -> io::Result<Box<dyn PrinterSession>>;
}

/// One open printer
///
/// Dropping a session releases whatever it holds (ends a started page or
/// document, closes the handle) without reporting errors.
pub trait PrinterSession: Send {
    /// Start a RAW print job
    fn start_document(&mut self, doc_name: &str) -> io::Result<()>;

    /// Start a page within the job
    fn start_page(&mut self) -> io::Result<()>;

    /// Write bytes, returning how many the printer accepted
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// End page and document and hand the job over
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// Run one RAW job through `transport`, mapping each stage failure to its
/// own error variant.
pub fn send_raw(
    transport: &dyn Transport,
    printer: &str,
    doc_name: &str,
    data: &[u8],
) -> DrawerResult<()> {
    let mut session = transport.open(printer).map_err(|source| {
        error!(printer, error = %source, "open printer failed");
        DrawerError::Open {
            printer: printer.to_string(),
            source,
        }
    })?;

    session.start_document(doc_name).map_err(|e| {
        error!(printer, error = %e, "start document failed");
        DrawerError::StartDoc(e)
    })?;

    session.start_page().map_err(|e| {
        error!(printer, error = %e, "start page failed");
        DrawerError::StartPage(e)
    })?;

    let written = session.write(data).map_err(|e| {
        error!(printer, error = %e, "write failed");
        DrawerError::Write(e)
    })?;

    if written != data.len() {
        warn!(printer, expected = data.len(), written, "incomplete write");
        return Err(DrawerError::IncompleteWrite {
            expected: data.len(),
            written,
        });
    }

    session.finish().map_err(|e| {
        error!(printer, error = %e, "end document failed");
        DrawerError::EndDoc(e)
    })?;

    info!(printer, bytes = data.len(), "raw job sent");
    Ok(())
}

/// Default raw printing port
pub const DEFAULT_RAW_PORT: u16 = 9100;

/// Network printer (raw TCP)
///
/// The printer "name" is an address: `host` or `host:port`. Most thermal
/// printers accept raw bytes on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkTransport {
    default_port: u16,
    timeout: Duration,
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_RAW_PORT,
            timeout: Duration::from_secs(5),
        }
    }
}

impl NetworkTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Port used when the address carries none
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Set connect / write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `host` or `host:port` to a socket address
    pub fn resolve(&self, printer: &str) -> io::Result<SocketAddr> {
        if let Ok(addr) = printer.parse::<SocketAddr>() {
            return Ok(addr);
        }
        let candidate = if printer.contains(':') {
            printer.to_string()
        } else {
            format!("{}:{}", printer, self.default_port)
        };
        candidate.to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid address: {}", printer),
            )
        })
    }
}

impl Transport for NetworkTransport {
    fn open(&self, printer: &str) -> io::Result<Box<dyn PrinterSession>> {
        let addr = self.resolve(printer)?;
        info!(%addr, "connecting to printer");

        let stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;
        Ok(Box::new(NetworkSession { stream }))
    }
}

struct NetworkSession {
    stream: TcpStream,
}

impl PrinterSession for NetworkSession {
    // A socket has no job or page framing.
    fn start_document(&mut self, _doc_name: &str) -> io::Result<()> {
        Ok(())
    }

    fn start_page(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.stream.write(data)
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.stream.flush()?;
        self.stream.shutdown(Shutdown::Write)
    }
}
