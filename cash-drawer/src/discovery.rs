//! Printer discovery backends
//!
//! A backend only fetches the raw listing; [`crate::listing`] normalises it.

use crate::error::{DrawerError, DrawerResult};
use crate::listing::{RawListing, decode_output};
use std::process::Command;
use tracing::debug;

/// Source of raw printer listings
pub trait Discovery: Send + Sync {
    fn list(&self) -> DrawerResult<RawListing>;
}

fn run(program: &str, args: &[String]) -> DrawerResult<Vec<u8>> {
    let output = Command::new(program)
        .env("LC_ALL", "C")
        .args(args)
        .output()
        .map_err(|e| DrawerError::Discovery(format!("{}: {}", program, e)))?;

    debug!(
        program,
        status = %output.status,
        stdout_len = output.stdout.len(),
        "discovery command finished"
    );

    if !output.status.success() && output.stdout.is_empty() {
        let stderr = decode_output(&output.stderr);
        return Err(DrawerError::Discovery(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

/// Any command printing a whitespace-column table with a header line
#[derive(Debug, Clone)]
pub struct CommandDiscovery {
    program: String,
    args: Vec<String>,
}

impl CommandDiscovery {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `wmic printer get name,default,status`
    pub fn wmic() -> Self {
        Self::new("wmic", &["printer", "get", "name,default,status"])
    }
}

impl Discovery for CommandDiscovery {
    fn list(&self) -> DrawerResult<RawListing> {
        let stdout = run(&self.program, &self.args)?;
        Ok(RawListing::Table(decode_output(&stdout)))
    }
}

/// CUPS `lpstat -p -d`
#[derive(Debug, Clone, Copy, Default)]
pub struct LpstatDiscovery;

impl Discovery for LpstatDiscovery {
    fn list(&self) -> DrawerResult<RawListing> {
        let stdout = run("lpstat", &["-p".to_string(), "-d".to_string()])?;
        Ok(RawListing::Lpstat(decode_output(&stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_discovery_error() {
        let discovery = CommandDiscovery::new("definitely-not-a-real-printer-tool", &[]);
        let err = discovery.list().unwrap_err();
        assert!(matches!(err, DrawerError::Discovery(_)));
    }

    #[test]
    fn test_wmic_preset() {
        let d = CommandDiscovery::wmic();
        assert_eq!(d.program, "wmic");
        assert_eq!(d.args, vec!["printer", "get", "name,default,status"]);
    }
}
