//! CUPS queues via the `lp` / `lpstat` command line tools

use super::{PrinterSession, Transport};
use std::io::{self, Write};
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// CUPS transport
///
/// "Open" checks the queue exists, the document is an `lp -o raw` job fed
/// through stdin, and the job is accepted once `lp` exits successfully.
#[derive(Debug, Clone, Copy, Default)]
pub struct CupsTransport;

impl Transport for CupsTransport {
    fn open(&self, printer: &str) -> io::Result<Box<dyn PrinterSession>> {
        check_queue_name(printer)?;

        let output = Command::new("lpstat")
            .env("LC_ALL", "C")
            .arg("-p")
            .arg(printer)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("printer not found ({})", stderr.trim()),
            ));
        }

        Ok(Box::new(CupsSession {
            printer: printer.to_string(),
            child: None,
        }))
    }
}

/// `lp` and `lpstat` would read a leading dash as an option
fn check_queue_name(printer: &str) -> io::Result<()> {
    if printer.starts_with('-') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid CUPS queue name '{}'", printer),
        ));
    }
    Ok(())
}

struct CupsSession {
    printer: String,
    child: Option<Child>,
}

impl PrinterSession for CupsSession {
    fn start_document(&mut self, doc_name: &str) -> io::Result<()> {
        let child = Command::new("lp")
            .env("LC_ALL", "C")
            .arg("-d")
            .arg(&self.printer)
            .arg("-t")
            .arg(doc_name)
            .arg("-o")
            .arg("raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        debug!(printer = %self.printer, pid = child.id(), "lp started");
        self.child = Some(child);
        Ok(())
    }

    // lp jobs have no page framing
    fn start_page(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let stdin = self
            .child
            .as_mut()
            .and_then(|c| c.stdin.as_mut())
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "lp is not running"))?;
        stdin.write(data)
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // Close stdin so lp sees end of job
        drop(child.stdin.take());

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(io::Error::other(format!(
                "lp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        debug!(
            printer = %self.printer,
            reply = %String::from_utf8_lossy(&output.stdout).trim(),
            "lp accepted job"
        );
        Ok(())
    }
}

impl Drop for CupsSession {
    fn drop(&mut self) {
        // Abandon a job that never reached finish()
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
