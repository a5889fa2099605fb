//! Behaviour tests for filling in and submitting the registration form.

use std::cell::RefCell;
use std::sync::Arc;

use registration::domain::form::{FormConfig, FormController, FormPorts, SubmitOutcome};
use registration::domain::person::{Field, PersonRecord};
use registration::domain::ports::KeyValueStore;
use registration::outbound::storage::InMemoryKeyValueStore;
use registration::test_support::{FixtureClock, ImmediateDelay};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const VALID_VALUES: [(Field, &str); 6] = [
    (Field::Lastname, "Dupont"),
    (Field::Firstname, "Jean"),
    (Field::Email, "jean.dupont@example.fr"),
    (Field::Birth, "1990-05-14"),
    (Field::PostCode, "75001"),
    (Field::Town, "Paris"),
];

struct FormWorld {
    store: Arc<InMemoryKeyValueStore>,
    form: RefCell<Option<FormController>>,
    outcome: RefCell<Option<SubmitOutcome>>,
}

impl FormWorld {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryKeyValueStore::new()),
            form: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    fn with_form<T>(&self, f: impl FnOnce(&mut FormController) -> T) -> T {
        let mut form = self.form.borrow_mut();
        f(form.as_mut().expect("form should be created first"))
    }

    fn outcome(&self) -> SubmitOutcome {
        self.outcome
            .borrow()
            .clone()
            .expect("form should be submitted first")
    }

    fn stored(&self) -> Option<PersonRecord> {
        self.store
            .get_item(FormConfig::default().storage_key.as_str())
            .expect("store read should succeed")
            .map(|raw| serde_json::from_str(&raw).expect("stored record should be JSON"))
    }
}

fn field(name: &str) -> Field {
    name.parse().expect("step should name a field")
}

#[fixture]
fn world() -> FormWorld {
    FormWorld::new()
}

#[given("an empty registration form on {year}-{month}-{day}")]
fn an_empty_registration_form(world: &FormWorld, year: i32, month: u32, day: u32) {
    let ports = FormPorts::new(
        world.store.clone(),
        Arc::new(ImmediateDelay),
        FixtureClock::shared_on(year, month, day),
    );
    *world.form.borrow_mut() = Some(FormController::new(ports, FormConfig::default()));
}

#[given("the form is filled with valid values")]
fn the_form_is_filled_with_valid_values(world: &FormWorld) {
    world.with_form(|form| {
        for (field, value) in VALID_VALUES {
            form.set_field(field, value);
            form.blur(field);
        }
    });
}

#[given("the {name} field contains {value}")]
fn the_field_contains(world: &FormWorld, name: String, value: String) {
    world.with_form(|form| form.set_field(field(&name), value));
}

#[when("the form is submitted")]
fn the_form_is_submitted(world: &FormWorld) {
    let outcome = world.with_form(|form| form.begin_submit().expect("submission should not fail"));
    *world.outcome.borrow_mut() = Some(outcome);
}

#[when("the settle delay elapses")]
fn the_settle_delay_elapses(world: &FormWorld) {
    assert!(world.with_form(FormController::complete_submit));
}

#[then("the submission is accepted")]
fn the_submission_is_accepted(world: &FormWorld) {
    assert!(matches!(world.outcome(), SubmitOutcome::Accepted(_)));
}

#[then("the submission is rejected")]
fn the_submission_is_rejected(world: &FormWorld) {
    assert_eq!(world.outcome(), SubmitOutcome::Rejected);
}

#[then("the last submission was already pending")]
fn the_last_submission_was_already_pending(world: &FormWorld) {
    assert_eq!(world.outcome(), SubmitOutcome::AlreadySubmitting);
}

#[then("the stored record has the postCode {post_code}")]
fn the_stored_record_has_the_post_code(world: &FormWorld, post_code: String) {
    let record = world.stored().expect("a record should be stored");
    assert_eq!(record.post_code, post_code);
}

#[then("nothing is stored")]
fn nothing_is_stored(world: &FormWorld) {
    assert_eq!(world.stored(), None);
}

#[then("the notice reads {message}")]
fn the_notice_reads(world: &FormWorld, message: String) {
    let notice = world.with_form(|form| form.notice());
    assert_eq!(notice.map(|notice| notice.message()), Some(message.as_str()));
}

#[then("every field is empty")]
fn every_field_is_empty(world: &FormWorld) {
    world.with_form(|form| {
        for field in Field::ALL {
            assert_eq!(form.value(field), "", "{field}");
        }
    });
}

#[then("the {name} field shows {message}")]
fn the_field_shows(world: &FormWorld, name: String, message: String) {
    let shown = world.with_form(|form| form.error(field(&name)).map(str::to_owned));
    assert_eq!(shown.as_deref(), Some(message.as_str()));
}

#[then("the form cannot be submitted")]
fn the_form_cannot_be_submitted(world: &FormWorld) {
    assert!(!world.with_form(|form| form.is_submittable()));
}

#[scenario(
    path = "tests/features/form_submission.feature",
    name = "A complete valid form is stored and cleared"
)]
fn a_complete_valid_form_is_stored_and_cleared(world: FormWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/form_submission.feature",
    name = "An invalid postal code blocks submission"
)]
fn an_invalid_postal_code_blocks_submission(world: FormWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/form_submission.feature",
    name = "An underage applicant is refused"
)]
fn an_underage_applicant_is_refused(world: FormWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/form_submission.feature",
    name = "A second submission while pending is ignored"
)]
fn a_second_submission_while_pending_is_ignored(world: FormWorld) {
    drop(world);
}
