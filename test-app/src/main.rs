// dastest command-line runner -- executes the DAS conformance suite against
// a serial device or the built-in simulator.
//
// Usage:
//   dastest-app run --port /dev/ttyUSB0
//   dastest-app run --port /dev/ttyUSB0 --mode delimited --baud 1200
//   dastest-app run --first-port
//   dastest-app run --sim
//   dastest-app run --sim --case arming --case activation
//   dastest-app list
//
// Exits 0 only when every case passed. RUST_LOG controls diagnostics
// (e.g. RUST_LOG=dastest=debug).

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use dastest::harness::{HarnessConfig, SuiteReport, TestCase, run_suite, scenarios};
use dastest::protocol::framing::FramingMode;
use dastest::serial::{SerialConfig, SerialTransport, available_endpoints, resolve};
use dastest::sim::SimulatedDas;
use dastest::Transport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// DAS conformance suite runner.
#[derive(Parser)]
#[command(name = "dastest-app", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the conformance suite against a device.
    Run(RunArgs),

    /// List serial endpoints present on this host.
    List,
}

#[derive(Parser)]
struct RunArgs {
    /// Serial endpoint path (e.g. /dev/ttyUSB0, COM3).
    #[arg(long, conflicts_with_all = ["first_port", "sim"])]
    port: Option<String>,

    /// Use the first serial endpoint the OS enumerates.
    #[arg(long, conflicts_with = "sim")]
    first_port: bool,

    /// Run against the built-in device simulator instead of hardware.
    #[arg(long)]
    sim: bool,

    /// Command framing mode.
    #[arg(long, default_value = "raw", value_enum)]
    mode: ModeArg,

    /// Baud rate for the serial line.
    #[arg(long, default_value_t = 1200)]
    baud: u32,

    /// Settle delay after each write, in milliseconds.
    #[arg(long, default_value_t = 250)]
    settle_ms: u64,

    /// Read deadline for one receive, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    /// Skip the priming Disarm sent before each case on real hardware.
    #[arg(long)]
    no_prime: bool,

    /// Run only the named case (repeatable). Default: the whole suite.
    #[arg(long = "case")]
    cases: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Raw,
    Delimited,
}

impl From<ModeArg> for FramingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Raw => FramingMode::Raw,
            ModeArg::Delimited => FramingMode::Delimited,
        }
    }
}

// ---------------------------------------------------------------------------
// Case selection
// ---------------------------------------------------------------------------

/// Pick the cases to run, honoring `--case` filters in suite order.
fn select_cases(filters: &[String]) -> Result<Vec<TestCase>> {
    let suite = scenarios::standard_suite();
    if filters.is_empty() {
        return Ok(suite);
    }

    for name in filters {
        if !suite.iter().any(|c| c.name() == name) {
            let known: Vec<&str> = suite.iter().map(|c| c.name()).collect();
            bail!("unknown case '{}'. Known cases: {}", name, known.join(", "));
        }
    }

    Ok(suite
        .into_iter()
        .filter(|c| filters.iter().any(|n| n == c.name()))
        .collect())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<()> {
    let endpoints = available_endpoints().context("failed to enumerate serial endpoints")?;

    if endpoints.is_empty() {
        println!("No serial endpoints found.");
        return Ok(());
    }

    for endpoint in &endpoints {
        println!("{endpoint}");
    }
    println!();
    println!("{} endpoint(s) found.", endpoints.len());

    Ok(())
}

async fn cmd_run(args: RunArgs) -> Result<SuiteReport> {
    let cases = select_cases(&args.cases)?;
    let mode: FramingMode = args.mode.into();

    let config = HarnessConfig {
        mode,
        settle_delay: Duration::from_millis(args.settle_ms),
        read_timeout: Duration::from_millis(args.timeout_ms),
        // The simulator starts in a known state; real hardware may not.
        prime: !args.sim && !args.no_prime,
        ..Default::default()
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current step");
            ctrl_c_cancel.cancel();
        }
    });

    let report = if args.sim {
        println!("Running {} case(s) against the simulator ({mode:?} mode)", cases.len());
        run_suite(
            &cases,
            &config,
            || async {
                let t: Box<dyn Transport> = Box::new(SimulatedDas::new(mode));
                Ok(t)
            },
            &cancel,
        )
        .await
    } else {
        let endpoint = match &args.port {
            Some(port) => port.clone(),
            None => {
                if !args.first_port {
                    bail!("one of --port, --first-port, or --sim is required");
                }
                let endpoints =
                    available_endpoints().context("failed to enumerate serial endpoints")?;
                resolve(&endpoints)
                    .context("no serial endpoint available")?
                    .to_owned()
            }
        };

        println!(
            "Running {} case(s) against {endpoint} at {} baud ({mode:?} mode)",
            cases.len(),
            args.baud
        );

        let serial_config = SerialConfig {
            baud_rate: args.baud,
            ..Default::default()
        };
        run_suite(
            &cases,
            &config,
            || {
                let endpoint = endpoint.clone();
                let serial_config = serial_config.clone();
                async move {
                    let t: Box<dyn Transport> = Box::new(
                        SerialTransport::open_with_config(&endpoint, serial_config).await?,
                    );
                    Ok(t)
                }
            },
            &cancel,
        )
        .await
    };

    Ok(report)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            cmd_list()?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => {
            let report = cmd_run(args).await?;
            println!();
            println!("{report}");
            if report.all_passed() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
