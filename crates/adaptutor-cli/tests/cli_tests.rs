//! CLI integration tests using assert_cmd.
//!
//! No provider keys are set, so every run is served by the offline
//! provider and built-in questions.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn adaptutor(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("adaptutor").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ADAPTUTOR_GEMINI_KEY")
        .env_remove("ADAPTUTOR_OPENAI_KEY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.path().join("data"));
    cmd
}

#[test]
fn questions_fall_back_without_a_provider() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .args(["questions", "--learner", "asha", "--grade", "3", "--subject", "math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"fallback\""))
        .stdout(predicate::str::contains("\"adaptedFrom\": \"initial assessment\""))
        .stdout(predicate::str::contains("\"difficultyTier\": \"beginner\""));
}

#[test]
fn full_round_updates_progress() {
    let dir = TempDir::new().unwrap();
    let round = dir.path().join("round.json");

    adaptutor(&dir)
        .args(["questions", "--learner", "asha", "--grade", "3", "--subject", "math", "--output"])
        .arg(&round)
        .assert()
        .success();
    assert!(round.exists());

    adaptutor(&dir)
        .args(["evaluate", "--learner", "asha", "--grade", "3", "--subject", "math", "--questions"])
        .arg(&round)
        .args([
            "--answer", "1=15",
            "--answer", "2=42",
            "--answer", "3=32 kg",
            "--answer", "4=10 rupees",
            "--answer", "5=4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"score\": 100"))
        .stdout(predicate::str::contains("\"currentTier\": \"advanced\""));

    adaptutor(&dir)
        .args(["progress", "--learner", "asha", "--subject", "math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("level advanced"))
        .stdout(predicate::str::contains("1 round(s)"));

    adaptutor(&dir)
        .args(["questions", "--learner", "asha", "--grade", "3", "--subject", "math"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"adaptedFrom\": \"previous performance\""))
        .stdout(predicate::str::contains("\"difficultyTier\": \"advanced\""));
}

#[test]
fn evaluate_rejects_out_of_range_grade() {
    let dir = TempDir::new().unwrap();
    let round = dir.path().join("round.json");
    std::fs::write(
        &round,
        r#"[{"id": 1, "question": "Q", "options": ["a", "b"], "correctAnswer": "a", "topic": "T"}]"#,
    )
    .unwrap();

    adaptutor(&dir)
        .args(["evaluate", "--learner", "asha", "--grade", "13"])
        .args(["--subject", "math", "--questions"])
        .arg(&round)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn unknown_subject_is_rejected() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .args(["questions", "--learner", "asha", "--grade", "3", "--subject", "science"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown subject"));
}

#[test]
fn progress_for_new_learner() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .args(["progress", "--learner", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No progress recorded"));
}

#[test]
fn plan_falls_back_without_a_provider() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .args(["plan", "--learner", "asha", "--grade", "4", "--subject", "english"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"fallback\""))
        .stdout(predicate::str::contains("English Practice Week"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created adaptutor.toml"));
    assert!(dir.path().join("adaptutor.toml").exists());

    adaptutor(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    adaptutor(&dir)
        .arg("list-models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-flash"));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .args(["progress", "--learner", "asha", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    adaptutor(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("questions"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("progress"));
}
