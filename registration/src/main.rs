//! `registration` command-line entry point.
//!
//! Parsing and command execution live in `registration::inbound::cli`; this
//! binary loads settings, wires the JSON file store and the Tokio delay, and
//! maps the outcome to a process exit code.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod settings;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use registration::inbound::cli::{CliArgs, CliContext, RunOutcome, run};
use registration::outbound::delay::TokioSubmissionDelay;
use registration::outbound::storage::JsonFileKeyValueStore;

use crate::settings::RegistrationSettings;

/// Exit status used when validation rejects the input.
const REJECTED: u8 = 2;
/// Exit status used for storage, configuration and output failures.
const FAILED: u8 = 1;

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let result = load_settings()
        .and_then(|settings| execute(args, &settings, &mut io::stdout().lock()));
    ExitCode::from(exit_status(result, &mut io::stderr().lock()))
}

fn load_settings() -> io::Result<RegistrationSettings> {
    RegistrationSettings::load_from_iter([OsString::from("registration")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))
}

fn execute<W: Write>(
    args: CliArgs,
    settings: &RegistrationSettings,
    out: &mut W,
) -> io::Result<RunOutcome> {
    let context = build_context(settings)?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;

    runtime
        .block_on(run(args.command, &context, out))
        .map_err(io::Error::other)
}

fn build_context(settings: &RegistrationSettings) -> io::Result<CliContext> {
    let storage_dir = Utf8PathBuf::from_path_buf(settings.storage_dir()).map_err(|path| {
        io::Error::other(format!(
            "storage directory {} is not valid UTF-8",
            path.display()
        ))
    })?;
    let store = JsonFileKeyValueStore::open(&storage_dir, settings.storage_file())
        .map_err(io::Error::other)?;

    Ok(CliContext {
        store: Arc::new(store),
        delay: Arc::new(TokioSubmissionDelay),
        clock: Arc::new(DefaultClock),
        form: settings.form_config(),
    })
}

/// Map a command result to the process exit status, reporting failures on
/// `stderr`.
fn exit_status<W: Write>(result: io::Result<RunOutcome>, stderr: &mut W) -> u8 {
    match result {
        Ok(RunOutcome::Completed) => 0,
        Ok(RunOutcome::Rejected) => REJECTED,
        Err(err) => {
            if let Err(write_err) = writeln!(stderr, "{err}") {
                warn!(error = %write_err, "failed to report error on stderr");
            }
            FAILED
        }
    }
}
