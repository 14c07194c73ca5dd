use email_parser::config::Settings;
use email_parser::pipeline::{BatchReport, Outcome, run_batch};
use email_parser::test_utils::{SourceFixture, TestProject};
use email_parser::utils::progress::MarkerProgress;
use email_parser::validator::{ExpectedCountsCache, generate_config};
use std::sync::Arc;

fn english_welcome() -> SourceFixture {
    SourceFixture::basic(
        "en",
        "welcome",
        &[("subject", "Welcome {{name}}"), ("title", "Hello"), ("content", "Hi **{{name}}**")],
    )
}

async fn render(settings: Settings) -> (BatchReport, String) {
    let settings = Arc::new(settings);
    let expected = Arc::new(ExpectedCountsCache::new(settings.placeholders_filepath()));
    let progress = MarkerProgress::hidden();
    let report = run_batch(settings, expected, &progress).await.unwrap();
    (report, progress.markers())
}

#[tokio::test]
async fn test_missing_subject_is_substituted_by_default_locale() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&english_welcome()).unwrap();
    project
        .add_source(&SourceFixture::basic("fr", "welcome", &[("title", "Bonjour"), ("content", "Salut")]))
        .unwrap();

    let (report, markers) = render(project.settings()).await;

    assert!(report.success());
    assert_eq!(markers.chars().filter(|c| *c == 'F').count(), 1);
    assert_eq!(report.substituted_count(), 1);

    let french = &report.items[1];
    assert_eq!(french.email.locale, "fr");
    match &french.outcome {
        Outcome::Substituted {
            from,
            reason,
        } => {
            assert_eq!(from, "en");
            assert!(reason.contains("Subject is required"), "unexpected reason: {reason}");
        }
        other => panic!("expected substitution, got {other:?}"),
    }

    assert_eq!(project.output("fr", "welcome.html").unwrap(), project.output("en", "welcome.html").unwrap());
    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Welcome {{name}}");
    assert!(
        report.warnings().iter().any(|w| w.starts_with("Email fr/welcome substituted by en/welcome")),
        "warnings: {:?}",
        report.warnings()
    );
}

#[tokio::test]
async fn test_invalid_translation_is_substituted() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&english_welcome()).unwrap();
    project
        .add_source(&SourceFixture::basic(
            "fr",
            "welcome",
            &[("subject", "Bienvenue {{name}}"), ("title", "Bonjour"), ("content", "Salut")],
        ))
        .unwrap();

    let settings = project.settings();
    let written = generate_config(&settings).unwrap();
    assert_eq!(written, Some(settings.placeholders_filepath()));

    let (report, _) = render(settings).await;

    assert!(report.success());
    match &report.items[1].outcome {
        Outcome::Substituted {
            reason,
            ..
        } => assert!(reason.contains("'name' should appear 2 times but appears 1"), "unexpected reason: {reason}"),
        other => panic!("expected substitution, got {other:?}"),
    }
    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Welcome {{name}}");
}

#[tokio::test]
async fn test_force_renders_invalid_translation_with_warning() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&english_welcome()).unwrap();
    project
        .add_source(&SourceFixture::basic(
            "fr",
            "welcome",
            &[("subject", "Bienvenue {{name}}"), ("title", "Bonjour"), ("content", "Salut")],
        ))
        .unwrap();
    generate_config(&project.settings()).unwrap();

    let settings = Settings {
        force: true,
        ..project.settings()
    };
    let (report, markers) = render(settings).await;

    assert!(report.success());
    assert_eq!(markers, "..");
    let french = &report.items[1];
    assert_eq!(french.outcome, Outcome::Written);
    assert!(french.warnings.iter().any(|w| w.contains("Placeholder validation failed")));
    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Bienvenue {{name}}");
}

#[tokio::test]
async fn test_default_locale_failure_is_not_substituted() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&SourceFixture::basic("en", "broken", &[("title", "Hello"), ("content", "Body")])).unwrap();
    project.add_source(&english_welcome()).unwrap();

    let (report, markers) = render(project.settings()).await;

    assert!(!report.success());
    assert_eq!(report.failed_count(), 1);
    assert!(markers.contains('E'));
    assert_eq!(report.errors().len(), 1);
    assert!(report.errors()[0].starts_with("en/broken:"));
    assert!(!project.file_exists("target/en/broken.html"));
    assert!(project.file_exists("target/en/welcome.html"));
}

#[tokio::test]
async fn test_fallback_fails_when_default_locale_also_fails() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&SourceFixture::basic("en", "welcome", &[("title", "Hello"), ("content", "Body")])).unwrap();
    project.add_source(&SourceFixture::basic("fr", "welcome", &[("title", "Bonjour"), ("content", "Corps")])).unwrap();

    let (report, _) = render(project.settings()).await;

    assert_eq!(report.failed_count(), 2);
    match &report.items[1].outcome {
        Outcome::Failed {
            reason,
        } => assert!(reason.contains("fallback to en failed"), "unexpected reason: {reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!project.file_exists("target/fr/welcome.html"));
}

#[tokio::test]
async fn test_missing_default_version_fails() {
    let project = TestProject::with_basic_template().unwrap();
    project
        .add_source(&SourceFixture::basic("fr", "orphan", &[("title", "Bonjour"), ("content", "Corps")]))
        .unwrap();

    let (report, _) = render(project.settings()).await;

    match &report.items[0].outcome {
        Outcome::Failed {
            reason,
        } => assert!(reason.contains("no en version to fall back to"), "unexpected reason: {reason}"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_translation_is_substituted() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&english_welcome()).unwrap();
    project
        .add_source(&SourceFixture::raw(
            "fr",
            "welcome",
            "<resources template=\"basic.html\" email_type=\"transactional\">\n\
             <string name=\"subject\">Bienvenue</string>\n\
             <string name=\"title\">Bonjour</strin>\n\
             </resources>\n",
        ))
        .unwrap();

    let (report, markers) = render(project.settings()).await;

    assert!(report.success());
    assert_eq!(markers.chars().filter(|c| *c == 'F').count(), 1);
    match &report.items[1].outcome {
        Outcome::Substituted {
            from,
            reason,
        } => {
            assert_eq!(from, "en");
            assert!(reason.contains("Malformed source"), "unexpected reason: {reason}");
            assert!(reason.contains("(inside 'title')"), "unexpected reason: {reason}");
        }
        other => panic!("expected substitution, got {other:?}"),
    }
    assert_eq!(project.output("fr", "welcome.html").unwrap(), project.output("en", "welcome.html").unwrap());
}

#[tokio::test]
async fn test_strict_missing_template_placeholder_is_substituted() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&english_welcome()).unwrap();
    project
        .add_source(&SourceFixture::basic("fr", "welcome", &[("subject", "Bienvenue {{name}}"), ("title", "Bonjour")]))
        .unwrap();

    let (report, _) = render(project.settings()).await;

    assert!(report.success());
    match &report.items[1].outcome {
        Outcome::Substituted {
            from,
            reason,
        } => {
            assert_eq!(from, "en");
            assert!(
                reason.contains("Failed to generate html content for template basic.html in locale fr"),
                "unexpected reason: {reason}"
            );
            assert!(reason.contains("missing placeholder 'content'"), "unexpected reason: {reason}");
        }
        other => panic!("expected substitution, got {other:?}"),
    }
    assert_eq!(project.output("fr", "welcome.html").unwrap(), project.output("en", "welcome.html").unwrap());
    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Welcome {{name}}");
}
