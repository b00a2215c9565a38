//! Outrigger CLI binary
//!
//! One-shot multi-process wrapper: starts a pre-exec command, optionally
//! waits for it to report healthy, runs the main command in the
//! foreground, and stops the pre-exec command once the main command exits.

#![allow(unused_crate_dependencies)]

use clap::Parser;
use outrigger_core::{RunOutcome, Supervisor};
use schema::{HealthCheckKind, HealthCheckSpec, PreExecSpec, ProcessSpec, RunSpec, SpecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "outrigger")]
#[command(about = "One-shot pre-exec/main process supervisor")]
#[command(version)]
struct Cli {
    /// Command to start before the main command, split on whitespace
    #[arg(long = "pre-exec", value_name = "COMMAND")]
    pre_exec: String,

    /// Health check kind gating the main command launch (http or tcp)
    #[arg(long, value_name = "KIND", requires = "health_port")]
    health_kind: Option<String>,

    /// Port the health check targets on localhost
    #[arg(long, value_name = "PORT")]
    health_port: Option<u16>,

    /// Path for http health checks
    #[arg(long, value_name = "PATH", default_value = "/")]
    health_path: String,

    /// Probe attempts before giving up
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    health_retries: u32,

    /// Seconds to wait between probe attempts
    #[arg(long, value_name = "SECS", default_value_t = 1)]
    health_interval: u64,

    /// Timeout for each probe in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    health_timeout: u64,

    /// Show debug logs
    #[arg(long)]
    debug: bool,

    /// Main command and its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

fn build_run_spec(cli: &Cli) -> Result<RunSpec, SpecError> {
    let pre_exec = ProcessSpec::from_tokens(cli.pre_exec.split_whitespace())?;
    let main = ProcessSpec::from_tokens(cli.command.clone())?;

    let health_check = match (&cli.health_kind, cli.health_port) {
        (Some(kind), Some(port)) => Some(HealthCheckSpec {
            kind: HealthCheckKind::from(kind.as_str()),
            port,
            path: cli.health_path.clone(),
            retries: cli.health_retries,
            interval_secs: cli.health_interval,
            timeout_secs: cli.health_timeout,
        }),
        _ => None,
    };

    Ok(RunSpec {
        pre_exec: PreExecSpec {
            process: pre_exec,
            health_check,
        },
        main,
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The binary owns the subscriber; the core only emits
    let level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let spec = match build_run_spec(&cli) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling run");
            ctrl_c_cancel.cancel();
        }
    });

    debug!(
        pre_exec = %cli.pre_exec,
        main = %cli.command.join(" "),
        "starting outrigger"
    );

    match Supervisor::new(spec).run(cancel).await {
        Ok(RunOutcome::Completed) => {}
        Ok(RunOutcome::Cancelled) => debug!("run cancelled"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
