//! # gtin
//!
//! Command line front-end for GTIN validation and CCG product lookup.
//!
//! ```text
//! $ gtin check 7890142547852
//! { "number": "7890142547852", "type": "GTIN-13", "prefix": "789",
//!   "region": "GS1 Brasil", "check_digit": 2, "restricted": false,
//!   "valid": true, "error": null }
//!
//! $ gtin consult 7894900011517 --pfx cert.pfx --password ****
//! { "success": true, "reason": "Data found.", "status_code": "9490", … }
//! ```
//!
//! Results go to stdout as JSON, logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use gtin_ccg::{load_pfx, CcgClient, CcgConfig};
use gtin_core::Gtin;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gtin", about = "GTIN validation and CCG product lookup", version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and classify a GTIN offline
    Check {
        /// GTIN-8/12/13/14 digits or "SEM GTIN"
        code: String,
    },

    /// Look a Brazilian GTIN up in the CCG registry
    Consult {
        /// GTIN digits (prefix 789 or 790)
        code: String,

        /// PKCS#12 client certificate
        #[arg(long, value_name = "FILE", env = "GTIN_PFX")]
        pfx: PathBuf,

        /// Certificate password
        #[arg(long, env = "GTIN_PFX_PASSWORD", hide_env_values = true)]
        password: String,

        /// CCG client config (defaults to the per-user ccg.toml)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

/// Offline classification printed by `gtin check`.
#[derive(Debug, Serialize)]
struct CheckReport {
    number: String,
    #[serde(rename = "type")]
    gtin_type: String,
    prefix: String,
    region: String,
    check_digit: u8,
    restricted: bool,
    valid: bool,
    error: Option<String>,
}

impl CheckReport {
    fn new(gtin: &Gtin) -> Self {
        let error = gtin.validate().err().map(|e| e.to_string());
        CheckReport {
            number: gtin.number().to_string(),
            gtin_type: gtin.gtin_type().to_string(),
            prefix: gtin.prefix().to_string(),
            region: gtin.region().to_string(),
            check_digit: gtin.check_digit(),
            restricted: gtin.is_restricted(),
            valid: error.is_none(),
            error,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn check(code: &str) -> anyhow::Result<ExitCode> {
    let gtin = Gtin::check(code)?;
    let report = CheckReport::new(&gtin);
    debug!(?report, "GTIN classified");
    print_json(&report)?;

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn consult(
    code: &str,
    pfx: PathBuf,
    password: &str,
    config: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let client = match config {
        Some(path) => CcgClient::new(CcgConfig::load(Some(path))?),
        None => CcgClient::from_env(),
    }
    .context("loading CCG configuration")?;
    info!(endpoint = %client.config().endpoint(), "Configuration loaded");

    let credential = load_pfx(&pfx, password)
        .await
        .with_context(|| format!("loading certificate {}", pfx.display()))?;

    let gtin = Gtin::check_with_credential(code, credential)?;
    let result = gtin.lookup(&client).await?;
    print_json(&result)?;

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check { code } => check(&code),
        Command::Consult {
            code,
            pfx,
            password,
            config,
        } => consult(&code, pfx, &password, config).await,
    }
}
