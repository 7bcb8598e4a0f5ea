//! cash-drawer: kick a receipt printer's cash drawer from the shell
//!
//! ```text
//! cash-drawer open "EPSON TM-T20III" --pin 1
//! cash-drawer open 192.168.1.50:9100 --network
//! cash-drawer list --source lpstat
//! cash-drawer codes
//! ```
//!
//! Results are printed to stdout as JSON. `open` exits non-zero unless the
//! drawer was kicked.

mod logger;

use cash_drawer::{
    CashDrawer, CommandDiscovery, Config, DEFAULT_RAW_PORT, Discovery, DrawerOptions, ErrorCode,
    LpstatDiscovery, NetworkTransport,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "cash-drawer", version, about = "Open a cash drawer through a receipt printer")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    /// Also write logs to a daily file in this directory
    #[arg(long, env = "LOG_DIR", global = true)]
    log_dir: Option<String>,

    /// Bound on one printer job (ms)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send the drawer-kick pulse to a printer
    Open {
        /// Printer name, or `host[:port]` with --network
        printer: String,

        /// Drawer connector pin (0 = pin 2, 1 = pin 5)
        #[arg(long)]
        pin: Option<i64>,

        /// Pulse on time (0-255)
        #[arg(long)]
        pulse_on: Option<i64>,

        /// Pulse off time (0-255)
        #[arg(long)]
        pulse_off: Option<i64>,

        /// Treat PRINTER as a raw TCP address instead of a spooler queue
        #[arg(long)]
        network: bool,

        /// Port used with --network when the address has none
        #[arg(long, default_value_t = DEFAULT_RAW_PORT)]
        port: u16,
    },

    /// List installed printers
    List {
        #[arg(long, value_enum, default_value_t = Source::Auto)]
        source: Source,
    },

    /// Print the result code table
    Codes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Platform default (spooler enumeration on Windows, lpstat elsewhere)
    Auto,
    Wmic,
    Lpstat,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json, cli.log_dir.as_deref())?;

    let mut config = Config::from_env();
    if let Some(ms) = cli.timeout_ms {
        config.transport_timeout_ms = ms;
    }

    match cli.command {
        Command::Open {
            printer,
            pin,
            pulse_on,
            pulse_off,
            network,
            port,
        } => {
            let defaults = config.default_options;
            let options = DrawerOptions {
                pin: pin.unwrap_or(defaults.pin),
                pulse_on_time: pulse_on.unwrap_or(defaults.pulse_on_time),
                pulse_off_time: pulse_off.unwrap_or(defaults.pulse_off_time),
            };

            let drawer = if network {
                let transport = NetworkTransport::new()
                    .with_default_port(port)
                    .with_timeout(config.transport_timeout());
                CashDrawer::new(transport, platform_discovery())
            } else {
                CashDrawer::system()
            }
            .with_config(config);

            let result = drawer.open_cash_drawer(&printer, Some(options)).await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            Ok(if result.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::List { source } => {
            let drawer = match source {
                Source::Auto => CashDrawer::system(),
                Source::Wmic => listing_drawer(CommandDiscovery::wmic()),
                Source::Lpstat => listing_drawer(LpstatDiscovery),
            }
            .with_config(config);

            let printers = drawer.get_available_printers().await;
            println!("{}", serde_json::to_string_pretty(&printers)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Codes => {
            let table: Vec<_> = ErrorCode::ALL
                .iter()
                .map(|code| {
                    json!({
                        "code": code.code(),
                        "name": code.name(),
                        "message": code.message(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// A drawer used only for listing; its transport is never touched
fn listing_drawer(discovery: impl Discovery + 'static) -> CashDrawer {
    CashDrawer::new(NetworkTransport::new(), discovery)
}

#[cfg(windows)]
fn platform_discovery() -> impl Discovery + 'static {
    cash_drawer::Win32Discovery
}

#[cfg(not(windows))]
fn platform_discovery() -> impl Discovery + 'static {
    LpstatDiscovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_open() {
        let cli = Cli::parse_from([
            "cash-drawer",
            "open",
            "EPSON TM-T20",
            "--pin",
            "1",
            "--pulse-on",
            "60",
        ]);
        match cli.command {
            Command::Open {
                printer,
                pin,
                pulse_on,
                pulse_off,
                network,
                port,
            } => {
                assert_eq!(printer, "EPSON TM-T20");
                assert_eq!(pin, Some(1));
                assert_eq!(pulse_on, Some(60));
                assert_eq!(pulse_off, None);
                assert!(!network);
                assert_eq!(port, 9100);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_source() {
        let cli = Cli::parse_from(["cash-drawer", "list", "--source", "wmic"]);
        assert!(matches!(
            cli.command,
            Command::List {
                source: Source::Wmic
            }
        ));

        let cli = Cli::parse_from(["cash-drawer", "list"]);
        assert!(matches!(
            cli.command,
            Command::List {
                source: Source::Auto
            }
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cash-drawer", "codes", "--timeout-ms", "500"]);
        assert_eq!(cli.timeout_ms, Some(500));
        assert!(matches!(cli.command, Command::Codes));
    }
}
