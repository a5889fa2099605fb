//! Registration form controller.
//!
//! Holds the six raw field values and a per-field state, re-validating the
//! whole form on every change. Submission is two-phase: [`begin_submit`]
//! persists the record and enters the submitting phase, [`complete_submit`]
//! clears the form once the settle delay has elapsed. While a submission is
//! pending further submissions are refused.
//!
//! [`begin_submit`]: FormController::begin_submit
//! [`complete_submit`]: FormController::complete_submit

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use mockable::Clock;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::person::{Field, PersonRecord};
use super::ports::{KeyValueStore, KeyValueStoreError, SubmissionDelay};
use super::validation::{ValidationError, validate_field};

/// Key under which submitted records are stored unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "formData";

/// Pause between persisting a record and clearing the form.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Validation state of a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    /// Untouched or cleared; blank once trimmed.
    Empty,
    /// Non-empty but rejected by its validator.
    Invalid(ValidationError),
    /// Accepted by its validator.
    Valid,
}

/// Whether a submission is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    /// Accepting input; submission allowed once every field is valid.
    #[default]
    Editing,
    /// A record has been persisted and the form is waiting to clear.
    Submitting,
}

/// Transient indication shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The record was persisted and the form is about to clear.
    Submitting,
    /// The submission finished and the form was cleared.
    Success,
}

impl Notice {
    /// Text shown for the notice.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Submitting => "Submitting...",
            Self::Success => "Registration saved",
        }
    }
}

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The record was persisted.
    Accepted(PersonRecord),
    /// At least one field is empty or invalid; inline messages explain why.
    Rejected,
    /// A previous submission has not finished yet.
    AlreadySubmitting,
}

/// Failures while persisting or reading back a submission.
#[derive(Debug, Error)]
pub enum FormError {
    /// The key-value store failed.
    #[error("failed to access registration storage: {0}")]
    Storage(#[from] KeyValueStoreError),
    /// The record could not be encoded or decoded as JSON.
    #[error("failed to encode registration as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for a [`FormController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Key under which submitted records are stored.
    pub storage_key: String,
    /// Pause between persisting a record and clearing the form.
    pub settle_delay: Duration,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Collaborators used by a [`FormController`].
#[derive(Clone)]
pub struct FormPorts {
    /// Where submitted records are written.
    pub store: Arc<dyn KeyValueStore>,
    /// Waits out the submitting indication.
    pub delay: Arc<dyn SubmissionDelay>,
    /// Source of "today" for the birth date check.
    pub clock: Arc<dyn Clock>,
}

impl FormPorts {
    /// Bundle the controller's collaborators.
    #[must_use]
    pub const fn new(
        store: Arc<dyn KeyValueStore>,
        delay: Arc<dyn SubmissionDelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            delay,
            clock,
        }
    }
}

/// State machine behind the registration form.
pub struct FormController {
    ports: FormPorts,
    config: FormConfig,
    record: PersonRecord,
    states: BTreeMap<Field, FieldState>,
    phase: FormPhase,
    notice: Option<Notice>,
}

impl FormController {
    /// Build an empty form.
    #[must_use]
    pub fn new(ports: FormPorts, config: FormConfig) -> Self {
        let states = Field::ALL
            .into_iter()
            .map(|field| (field, FieldState::Empty))
            .collect();
        Self {
            ports,
            config,
            record: PersonRecord::default(),
            states,
            phase: FormPhase::Editing,
            notice: None,
        }
    }

    /// Store a new raw value for `field` and re-validate the whole form.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.record.set(field, value);
        debug!(field = %field, "form field changed");
        self.revalidate_all();
    }

    /// Re-validate `field` after it loses focus.
    pub fn blur(&mut self, field: Field) {
        let today = self.today();
        let state = evaluate(&self.record, field, today);
        self.states.insert(field, state);
    }

    /// Current raw value of `field`.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        self.record.get(field)
    }

    /// Current validation state of `field`.
    #[must_use]
    pub fn field_state(&self, field: Field) -> FieldState {
        self.states.get(&field).cloned().unwrap_or(FieldState::Empty)
    }

    /// Advisory message for `field`, if it is invalid.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&str> {
        match self.states.get(&field) {
            Some(FieldState::Invalid(error)) => Some(error.message()),
            _ => None,
        }
    }

    /// Every invalid field with its failure, in display order.
    pub fn errors(&self) -> impl Iterator<Item = (Field, &ValidationError)> + '_ {
        self.states.iter().filter_map(|(field, state)| match state {
            FieldState::Invalid(error) => Some((*field, error)),
            _ => None,
        })
    }

    /// The record as currently typed.
    #[must_use]
    pub const fn record(&self) -> &PersonRecord {
        &self.record
    }

    /// Whether a submission is pending.
    #[must_use]
    pub const fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Transient indication to display, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Clear the transient indication.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// True when every field is valid and no submission is pending.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.phase == FormPhase::Editing && self.all_valid()
    }

    /// Validate and persist the record, entering the submitting phase.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] when the record cannot be encoded or stored; the
    /// form stays in the editing phase.
    pub fn begin_submit(&mut self) -> Result<SubmitOutcome, FormError> {
        if self.phase == FormPhase::Submitting {
            warn!("submission ignored: previous submission still pending");
            return Ok(SubmitOutcome::AlreadySubmitting);
        }

        self.revalidate_all();
        if !self.all_valid() {
            let missing: Vec<&str> = self.record.blank_fields().map(Field::key).collect();
            let invalid: Vec<&str> = self.errors().map(|(field, _)| field.key()).collect();
            warn!(?missing, ?invalid, "submission rejected: form is not valid");
            return Ok(SubmitOutcome::Rejected);
        }

        let payload = serde_json::to_string(&self.record)?;
        self.ports
            .store
            .set_item(&self.config.storage_key, &payload)
            .inspect_err(|error| warn!(error = %error, "failed to persist registration"))?;

        self.phase = FormPhase::Submitting;
        self.notice = Some(Notice::Submitting);
        info!(key = %self.config.storage_key, "registration persisted");
        Ok(SubmitOutcome::Accepted(self.record.clone()))
    }

    /// Clear the form after a pending submission; returns `false` when no
    /// submission was pending.
    pub fn complete_submit(&mut self) -> bool {
        if self.phase != FormPhase::Submitting {
            return false;
        }
        self.record = PersonRecord::default();
        self.revalidate_all();
        self.phase = FormPhase::Editing;
        self.notice = Some(Notice::Success);
        debug!("registration form cleared");
        true
    }

    /// Submit, wait out the settle delay, then clear the form.
    ///
    /// # Errors
    ///
    /// See [`FormController::begin_submit`].
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        self.submit_with(|_| {}).await
    }

    /// [`FormController::submit`], handing each raised notice to
    /// `on_notice` as soon as it is shown.
    ///
    /// `on_notice` sees [`Notice::Submitting`] before the settle delay and
    /// [`Notice::Success`] after the form is cleared.
    ///
    /// # Errors
    ///
    /// See [`FormController::begin_submit`].
    pub async fn submit_with<F>(&mut self, mut on_notice: F) -> Result<SubmitOutcome, FormError>
    where
        F: FnMut(Notice),
    {
        let outcome = self.begin_submit()?;
        if !matches!(outcome, SubmitOutcome::Accepted(_)) {
            return Ok(outcome);
        }
        if let Some(notice) = self.notice {
            on_notice(notice);
        }

        let delay = Arc::clone(&self.ports.delay);
        delay.wait(self.config.settle_delay).await;
        self.complete_submit();
        if let Some(notice) = self.notice {
            on_notice(notice);
        }
        Ok(outcome)
    }

    /// Read back the last persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] when the store fails or holds undecodable JSON.
    pub fn last_submission(&self) -> Result<Option<PersonRecord>, FormError> {
        let Some(raw) = self.ports.store.get_item(&self.config.storage_key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn today(&self) -> NaiveDate {
        self.ports.clock.local().date_naive()
    }

    fn all_valid(&self) -> bool {
        self.states.values().all(|state| *state == FieldState::Valid)
    }

    fn revalidate_all(&mut self) {
        let today = self.today();
        for field in Field::ALL {
            let state = evaluate(&self.record, field, today);
            self.states.insert(field, state);
        }
    }
}

fn evaluate(record: &PersonRecord, field: Field, today: NaiveDate) -> FieldState {
    let value = record.get(field);
    if value.trim().is_empty() {
        return FieldState::Empty;
    }
    match validate_field(field, value, today) {
        Ok(()) => FieldState::Valid,
        Err(error) => FieldState::Invalid(error),
    }
}
