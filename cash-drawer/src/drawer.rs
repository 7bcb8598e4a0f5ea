//! Cash drawer facade
//!
//! Per call: validate name → reject virtual printers → encode → send → map
//! the outcome into an [`OpenResult`]. Nothing is shared between calls
//! except the per-printer gates that keep two kicks to the same device from
//! interleaving.

use crate::classify;
use crate::config::Config;
use crate::discovery::Discovery;
use crate::error::{DrawerError, DrawerResult, OpenResult};
use crate::escpos::DrawerOptions;
use crate::listing::{self, PrinterInfo};
use crate::printer::{self, Transport};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Longest printer name accepted
pub const MAX_PRINTER_NAME_LENGTH: usize = 256;

/// Per-printer job gates
type Gates = DashMap<String, Arc<Mutex<()>>>;

/// Drawer kicks and printer discovery over pluggable backends
pub struct CashDrawer {
    transport: Arc<dyn Transport>,
    discovery: Arc<dyn Discovery>,
    config: Config,
    gates: Arc<Gates>,
}

impl CashDrawer {
    pub fn new(transport: impl Transport + 'static, discovery: impl Discovery + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            discovery: Arc::new(discovery),
            config: Config::default(),
            gates: Arc::new(DashMap::new()),
        }
    }

    /// Win32 spooler + EnumPrinters
    #[cfg(windows)]
    pub fn system() -> Self {
        Self::new(printer::WindowsTransport, printer::Win32Discovery)
    }

    /// CUPS `lp` + `lpstat`
    #[cfg(unix)]
    pub fn system() -> Self {
        Self::new(printer::CupsTransport, crate::discovery::LpstatDiscovery)
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the cash drawer attached to `printer_name`
    ///
    /// `None` options use the configured defaults. Never fails: every
    /// problem comes back as a coded [`OpenResult`].
    #[instrument(skip_all, fields(printer = %printer_name))]
    pub async fn open_cash_drawer(
        &self,
        printer_name: &str,
        options: Option<DrawerOptions>,
    ) -> OpenResult {
        let defaults = self.config.default_options;
        self.kick(printer_name, || Ok(options.unwrap_or(defaults)))
            .await
            .into()
    }

    /// Same as [`open_cash_drawer`](Self::open_cash_drawer) for loosely typed
    /// callers: a non-string name fails with `INVALID_NAME`, and options are a
    /// JSON object with optional `pin`, `pulseOnTime`, `pulseOffTime`.
    #[instrument(skip_all)]
    pub async fn open_cash_drawer_json(&self, printer_name: &Value, options: &Value) -> OpenResult {
        let Some(name) = printer_name.as_str() else {
            warn!(kind = json_kind(printer_name), "printer name is not a string");
            return DrawerError::InvalidName("printerName must be a string.".into()).into();
        };
        let defaults = self.config.default_options;
        self.kick(name, || options_from_json(options, defaults))
            .await
            .into()
    }

    async fn kick(
        &self,
        printer_name: &str,
        options: impl FnOnce() -> DrawerResult<DrawerOptions>,
    ) -> DrawerResult<()> {
        validate_name(printer_name)?;

        if classify::is_virtual(printer_name) {
            warn!(printer = printer_name, "refusing virtual printer");
            return Err(DrawerError::VirtualBlocked(printer_name.to_string()));
        }

        let command = options()?.validate()?.encode();
        self.send(printer_name, &command).await
    }

    /// Hand the bytes to the transport on the blocking pool, one job per
    /// printer at a time. Waiting for the printer's gate counts against the
    /// same deadline as the job itself.
    async fn send(&self, printer_name: &str, data: &[u8]) -> DrawerResult<()> {
        let gate = self.gates.entry(printer_name.to_string()).or_default().clone();

        let gates = Arc::clone(&self.gates);
        let transport = Arc::clone(&self.transport);
        let printer = printer_name.to_string();
        let doc_name = self.config.document_name.clone();
        let data = data.to_vec();

        let job = async {
            let guard = Arc::clone(&gate).lock_owned().await;
            // The guard travels with the job so the gate stays shut until the
            // device call really returns, even after a timeout.
            tokio::task::spawn_blocking(move || {
                let result = printer::send_raw(transport.as_ref(), &printer, &doc_name, &data);
                drop(guard);
                release_gate(&gates, &printer);
                result
            })
            .await
        };

        let after = self.config.transport_timeout();
        let outcome = tokio::time::timeout(after, job).await;
        drop(gate);
        release_gate(&self.gates, printer_name);

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(DrawerError::Other(format!("Drawer task failed: {}", e))),
            Err(_) => {
                warn!(printer = printer_name, ?after, "drawer kick timed out");
                Err(DrawerError::Timeout {
                    operation: format!("Drawer kick on '{}'", printer_name),
                    after,
                })
            }
        }
    }

    #[cfg(test)]
    fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// List installed printers
    ///
    /// Best-effort: any discovery failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn get_available_printers(&self) -> Vec<PrinterInfo> {
        match self.discover().await {
            Ok(printers) => {
                info!(count = printers.len(), "printers discovered");
                printers
            }
            Err(e) => {
                warn!(error = %e, "printer discovery failed, returning empty list");
                Vec::new()
            }
        }
    }

    async fn discover(&self) -> DrawerResult<Vec<PrinterInfo>> {
        let discovery = Arc::clone(&self.discovery);
        let task = tokio::task::spawn_blocking(move || discovery.list());

        let after = self.config.discovery_timeout();
        let raw = match tokio::time::timeout(after, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => return Err(DrawerError::Other(format!("Discovery task failed: {}", e))),
            Err(_) => {
                return Err(DrawerError::Timeout {
                    operation: "Printer discovery".into(),
                    after,
                });
            }
        };

        Ok(listing::parse(&raw))
    }
}

/// Drop a printer's gate once nobody holds or waits on it
///
/// Clones are taken under the map's shard lock, so a count of one here means
/// the map owns the only reference.
fn release_gate(gates: &Gates, printer_name: &str) {
    gates.remove_if(printer_name, |_, gate| Arc::strong_count(gate) == 1);
}

fn validate_name(name: &str) -> DrawerResult<()> {
    if name.trim().is_empty() {
        return Err(DrawerError::InvalidName(
            "Printer name cannot be empty".into(),
        ));
    }
    if name.len() > MAX_PRINTER_NAME_LENGTH {
        return Err(DrawerError::InvalidName(format!(
            "Printer name too long. Maximum length is {} characters",
            MAX_PRINTER_NAME_LENGTH
        )));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integer value, also accepting integral floats such as `50.0`
fn json_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Overlay a JSON options object on `defaults`
///
/// `null` (or a missing / `null` field) keeps the default; anything that is
/// not an integer is rejected.
fn options_from_json(value: &Value, defaults: DrawerOptions) -> DrawerResult<DrawerOptions> {
    let fields = match value {
        Value::Null => return Ok(defaults),
        Value::Object(fields) => fields,
        other => {
            return Err(DrawerError::InvalidArgument(format!(
                "options must be an object, got {}",
                json_kind(other)
            )));
        }
    };

    let field = |key: &str, default: i64| -> DrawerResult<i64> {
        match fields.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => json_integer(v).ok_or_else(|| {
                DrawerError::InvalidArgument(format!("{} must be an integer", key))
            }),
        }
    };

    Ok(DrawerOptions {
        pin: field("pin", defaults.pin)?,
        pulse_on_time: field("pulseOnTime", defaults.pulse_on_time)?,
        pulse_off_time: field("pulseOffTime", defaults.pulse_off_time)?,
    })
}

#[cfg(any(windows, unix))]
static SYSTEM: std::sync::LazyLock<CashDrawer> =
    std::sync::LazyLock::new(|| CashDrawer::system().with_config(Config::from_env()));

/// Open the cash drawer through the platform's spooler
#[cfg(any(windows, unix))]
pub async fn open_cash_drawer(printer_name: &str, options: Option<DrawerOptions>) -> OpenResult {
    SYSTEM.open_cash_drawer(printer_name, options).await
}

/// List printers installed on this host
#[cfg(any(windows, unix))]
pub async fn get_available_printers() -> Vec<PrinterInfo> {
    SYSTEM.get_available_printers().await
}
