//! End-to-end runs of the `registration` binary.
//!
//! Each run happens in a fresh working directory with every `REGISTRATION_*`
//! variable removed, so the default settings are exercised.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rstest::{fixture, rstest};
use tempfile::TempDir;

const SETTINGS_VARS: [&str; 4] = [
    "REGISTRATION_STORAGE_DIR",
    "REGISTRATION_STORAGE_FILE",
    "REGISTRATION_STORAGE_KEY",
    "REGISTRATION_SUBMIT_DELAY_MS",
];

fn registration_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_registration"))
}

fn run_in(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(registration_bin());
    cmd.args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG");
    for var in SETTINGS_VARS {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());
    cmd.output().expect("registration binary should start")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("stderr should be UTF-8")
}

#[fixture]
fn workdir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[rstest]
fn counter_succeeds_with_default_settings(workdir: TempDir) {
    let output = run_in(workdir.path(), &["counter", "--clicks", "2"], &[]);

    assert_eq!(output.status.code(), Some(0), "{}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "Count: 2\n");
    assert!(workdir.path().join(".registration").is_dir());
}

#[rstest]
fn age_prints_whole_years(workdir: TempDir) {
    let output = run_in(
        workdir.path(),
        &["age", "--birth", "1991-11-07", "--on", "2026-12-01"],
        &[],
    );

    assert_eq!(output.status.code(), Some(0), "{}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "35\n");
}

#[rstest]
fn rejected_record_exits_with_two(workdir: TempDir) {
    let record = r#"{"lastname":"Dupont","firstname":"Jean","email":"test@",
        "birth":"1990-05-14","postCode":"75001","town":"Paris"}"#;

    let output = run_in(workdir.path(), &["check", record], &[]);

    assert_eq!(output.status.code(), Some(2), "{}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Email: Invalid email (INVALID_EMAIL)"));
}

#[rstest]
fn failures_exit_with_one_and_report_on_stderr(workdir: TempDir) {
    let output = run_in(workdir.path(), &["age", "--birth", "1969-12-31"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("cannot compute age: invalid date"));
}

#[rstest]
fn register_then_show_round_trips_through_the_default_store(workdir: TempDir) {
    let fast = [("REGISTRATION_SUBMIT_DELAY_MS", "0")];
    let registered = run_in(
        workdir.path(),
        &[
            "register",
            "--lastname",
            "Dupont",
            "--firstname",
            "Jean",
            "--email",
            "jean@example.fr",
            "--birth",
            "1990-05-14",
            "--post-code",
            "75001",
            "--town",
            "Paris",
        ],
        &fast,
    );
    assert_eq!(registered.status.code(), Some(0), "{}", stderr_of(&registered));
    assert!(
        workdir
            .path()
            .join(".registration")
            .join("local-storage.json")
            .is_file()
    );

    let shown = run_in(workdir.path(), &["show"], &[]);

    assert_eq!(shown.status.code(), Some(0), "{}", stderr_of(&shown));
    assert!(stdout_of(&shown).contains(r#""town": "Paris""#));
}
