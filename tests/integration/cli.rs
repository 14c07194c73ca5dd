use assert_cmd::Command;
use email_parser::test_utils::{SourceFixture, TestProject};
use predicates::prelude::*;

fn email_parser(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("email-parser").unwrap();
    cmd.arg("--root").arg(project.path()).arg("--no-progress").env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn project() -> TestProject {
    let project = TestProject::with_basic_template().unwrap();
    project
        .add_source(&SourceFixture::basic(
            "en",
            "welcome",
            &[("subject", "Welcome {{name}}"), ("title", "Hello"), ("content", "Hi {{name}}")],
        ))
        .unwrap();
    project
        .add_source(&SourceFixture::basic(
            "fr",
            "welcome",
            &[("subject", "Bienvenue"), ("title", "Bonjour"), ("content", "Salut")],
        ))
        .unwrap();
    project
}

#[test]
fn test_render_is_the_default_command() {
    let project = project();

    email_parser(&project).assert().success().stdout(predicate::str::contains(".."));

    assert!(project.file_exists("target/en/welcome.subject"));
    assert!(project.file_exists("target/fr/welcome.text"));
}

#[test]
fn test_render_flags_override_configuration() {
    let project = project();
    project.create_file("email-parser.toml", "destination = \"configured\"\n").unwrap();

    email_parser(&project).args(["render", "--destination", "out", "--workers", "1"]).assert().success();

    assert!(project.file_exists("out/en/welcome.html"));
    assert!(!project.file_exists("configured"));
}

#[test]
fn test_render_reports_substitutions() {
    let project = project();
    email_parser(&project).arg("placeholders").assert().success();

    email_parser(&project)
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("F"))
        .stderr(predicate::str::contains("WARNINGS:"))
        .stderr(predicate::str::contains("Email fr/welcome substituted by en/welcome"));

    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Welcome {{name}}");
}

#[test]
fn test_render_fails_when_an_email_fails() {
    let project = project();
    project
        .add_source(&SourceFixture::basic("en", "broken", &[("title", "Hello"), ("content", "Body")]))
        .unwrap();

    email_parser(&project)
        .arg("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERRORS:"))
        .stderr(predicate::str::contains("1 of 3 emails failed to render"));
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let project = project();

    email_parser(&project)
        .args(["render", "--pattern", "{locale}.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("{name} is a required parameter in the pattern"));
}

#[test]
fn test_placeholders_command_writes_counts() {
    let project = project();

    email_parser(&project)
        .arg("placeholders")
        .assert()
        .success()
        .stdout(predicate::str::contains("placeholders_config.json"));

    let config = project.read_file("src/placeholders_config.json").unwrap();
    assert_eq!(config, "{\n    \"welcome\": {\n        \"name\": 2\n    }\n}");
}

#[test]
fn test_validate_command() {
    let project = project();

    email_parser(&project)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 2 emails are valid"));

    email_parser(&project).arg("placeholders").assert().success();

    email_parser(&project)
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("✓ en/welcome"))
        .stdout(predicate::str::contains("✗ fr/welcome: missing placeholders name"))
        .stderr(predicate::str::contains("1 of 2 emails failed validation"));
}
