//! Command-line surface for the registration form.
//!
//! Argument parsing and command execution live here rather than in the
//! binary so they can be driven in-process by tests. Output goes to any
//! [`Write`] sink.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use mockable::Clock;
use serde_json::{Value, json};
use thiserror::Error;

use crate::domain::age::{AgeCalculator, AgeError};
use crate::domain::calendar::parse_calendar_date;
use crate::domain::counter::Counter;
use crate::domain::form::{FieldState, FormConfig, FormController, FormError, FormPorts, SubmitOutcome};
use crate::domain::person::Field;
use crate::domain::ports::{KeyValueStore, SubmissionDelay};
use crate::domain::validation::validate_record_value;

/// `registration` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "registration",
    about = "Validate, calculate ages for, and locally store registration records",
    version
)]
pub struct CliArgs {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations offered by the binary.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fill the form with the given values and submit it.
    Register(RegisterArgs),
    /// Validate a JSON record without storing it.
    Check {
        /// JSON object with the six record fields.
        #[arg(value_name = "json")]
        json: String,
    },
    /// Compute an age in whole years.
    Age {
        /// Birth date, `YYYY-MM-DD`.
        #[arg(long, value_name = "date")]
        birth: String,
        /// Reference date, `YYYY-MM-DD`; defaults to today.
        #[arg(long = "on", value_name = "date", value_parser = parse_reference_date)]
        on: Option<NaiveDate>,
    },
    /// Print the last stored record.
    Show,
    /// Run the increment counter demo.
    Counter {
        /// Number of increments to apply.
        #[arg(long, default_value_t = 1)]
        clicks: u64,
    },
}

/// Values typed into the registration form.
#[derive(Debug, Clone, Default, Args)]
pub struct RegisterArgs {
    /// Family name.
    #[arg(long, default_value = "")]
    pub lastname: String,
    /// Given name.
    #[arg(long, default_value = "")]
    pub firstname: String,
    /// Contact email address.
    #[arg(long, default_value = "")]
    pub email: String,
    /// Date of birth, `YYYY-MM-DD`.
    #[arg(long, default_value = "")]
    pub birth: String,
    /// Five-digit postal code.
    #[arg(long = "post-code", default_value = "")]
    pub post_code: String,
    /// Town of residence.
    #[arg(long, default_value = "")]
    pub town: String,
}

impl RegisterArgs {
    fn values(&self) -> [(Field, &str); 6] {
        [
            (Field::Lastname, self.lastname.as_str()),
            (Field::Firstname, self.firstname.as_str()),
            (Field::Email, self.email.as_str()),
            (Field::Birth, self.birth.as_str()),
            (Field::PostCode, self.post_code.as_str()),
            (Field::Town, self.town.as_str()),
        ]
    }
}

fn parse_reference_date(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw).map_err(|error| format!("invalid reference date '{raw}': {error}"))
}

/// Whether a command achieved what was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The command succeeded.
    Completed,
    /// The input was rejected by validation; nothing was stored.
    Rejected,
}

/// Failures surfaced to the command-line user.
#[derive(Debug, Error)]
pub enum CliError {
    /// Submitting or reading back the form failed.
    #[error(transparent)]
    Form(#[from] FormError),
    /// The age calculator rejected its input.
    #[error("cannot compute age: {0}")]
    Age(#[from] AgeError),
    /// The `check` argument is not JSON.
    #[error("invalid JSON record: {0}")]
    Json(#[from] serde_json::Error),
    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Collaborators shared by every command.
#[derive(Clone)]
pub struct CliContext {
    /// Local key-value store.
    pub store: Arc<dyn KeyValueStore>,
    /// Pause used while a submission settles.
    pub delay: Arc<dyn SubmissionDelay>,
    /// Source of "today".
    pub clock: Arc<dyn Clock>,
    /// Form controller tunables.
    pub form: FormConfig,
}

impl CliContext {
    fn controller(&self) -> FormController {
        let ports = FormPorts::new(
            Arc::clone(&self.store),
            Arc::clone(&self.delay),
            Arc::clone(&self.clock),
        );
        FormController::new(ports, self.form.clone())
    }

    fn today(&self) -> NaiveDate {
        self.clock.local().date_naive()
    }
}

/// Execute `command`, writing user-facing text to `out`.
///
/// # Errors
///
/// Returns [`CliError`] on storage, age-calculation, JSON or output failures.
/// Validation rejections are reported through [`RunOutcome::Rejected`].
pub async fn run<W: Write>(
    command: Command,
    context: &CliContext,
    out: &mut W,
) -> Result<RunOutcome, CliError> {
    match command {
        Command::Register(args) => register(&args, context, out).await,
        Command::Check { json } => check(&json, context, out),
        Command::Age { birth, on } => age(&birth, on, context, out),
        Command::Show => show(context, out),
        Command::Counter { clicks } => counter(clicks, out),
    }
}

async fn register<W: Write>(
    args: &RegisterArgs,
    context: &CliContext,
    out: &mut W,
) -> Result<RunOutcome, CliError> {
    let mut form = context.controller();
    for (field, value) in args.values() {
        form.set_field(field, value);
        form.blur(field);
    }

    for field in Field::ALL {
        match form.field_state(field) {
            FieldState::Valid => writeln!(out, "{}: ok", field.label())?,
            FieldState::Empty => writeln!(out, "{}: required", field.label())?,
            FieldState::Invalid(error) => writeln!(out, "{}: {}", field.label(), error.message())?,
        }
    }

    let mut written = Ok(());
    let outcome = form
        .submit_with(|notice| {
            if written.is_ok() {
                written = writeln!(out, "{}", notice.message());
            }
        })
        .await?;
    written?;

    match outcome {
        SubmitOutcome::Accepted(_) => Ok(RunOutcome::Completed),
        SubmitOutcome::Rejected | SubmitOutcome::AlreadySubmitting => {
            let missing: Vec<&str> = form.record().blank_fields().map(Field::label).collect();
            if missing.is_empty() {
                writeln!(out, "Form is invalid; nothing was saved.")?;
            } else {
                writeln!(
                    out,
                    "Form is incomplete; nothing was saved. Missing: {}.",
                    missing.join(", ")
                )?;
            }
            Ok(RunOutcome::Rejected)
        }
    }
}

fn check<W: Write>(raw: &str, context: &CliContext, out: &mut W) -> Result<RunOutcome, CliError> {
    let record: Value = serde_json::from_str(raw)?;
    let failures = validate_record_value(&record, context.today());

    for field in Field::ALL {
        match failures.get(&field) {
            Some(error) => writeln!(
                out,
                "{}: {} ({})",
                field.label(),
                error.message(),
                error.kind().as_str()
            )?,
            None => writeln!(out, "{}: ok", field.label())?,
        }
    }

    if failures.is_empty() {
        Ok(RunOutcome::Completed)
    } else {
        Ok(RunOutcome::Rejected)
    }
}

fn age<W: Write>(
    birth: &str,
    on: Option<NaiveDate>,
    context: &CliContext,
    out: &mut W,
) -> Result<RunOutcome, CliError> {
    let calculator = AgeCalculator::new(Arc::clone(&context.clock));
    let subject = json!({ "birth": birth });
    let years = calculator.age_of(Some(&subject), on)?;
    writeln!(out, "{years}")?;
    Ok(RunOutcome::Completed)
}

fn show<W: Write>(context: &CliContext, out: &mut W) -> Result<RunOutcome, CliError> {
    match context.controller().last_submission()? {
        Some(record) => writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?,
        None => writeln!(out, "No registration saved yet.")?,
    }
    Ok(RunOutcome::Completed)
}

fn counter<W: Write>(clicks: u64, out: &mut W) -> Result<RunOutcome, CliError> {
    let mut counter = Counter::new();
    for _ in 0..clicks {
        counter.increment();
    }
    writeln!(out, "Count: {}", counter.value())?;
    Ok(RunOutcome::Completed)
}
