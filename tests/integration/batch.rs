use email_parser::config::Settings;
use email_parser::pipeline::{BatchReport, Outcome, run_batch};
use email_parser::test_utils::{SourceFixture, TestProject};
use email_parser::utils::progress::MarkerProgress;
use email_parser::validator::ExpectedCountsCache;
use std::sync::Arc;

fn welcome(locale: &str, subject: &str, title: &str) -> SourceFixture {
    SourceFixture::basic(
        locale,
        "welcome",
        &[("subject", subject), ("title", title), ("content", "Hi **{{name}}**")],
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
async fn test_batch_writes_every_artifact() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&welcome("en", "Welcome {{name}}", "Hello")).unwrap();
    project.add_source(&welcome("fr", "Bienvenue {{name}}", "Bonjour")).unwrap();

    let (report, markers) = render(project.settings()).await;

    assert!(report.success());
    assert_eq!(report.items.len(), 2);
    assert!(report.items.iter().all(|item| item.outcome == Outcome::Written));
    assert_eq!(markers, "..");

    assert_eq!(project.output("en", "welcome.subject").unwrap(), "Welcome {{name}}");
    assert_eq!(project.output("fr", "welcome.subject").unwrap(), "Bienvenue {{name}}");

    let html = project.output("fr", "welcome.html").unwrap();
    assert!(html.contains("<h1><p>Bonjour</p></h1>"));
    assert!(html.contains("<strong>{{name}}</strong>"));
    assert!(html.contains("Envoyé avec soin"));

    let text = project.output("en", "welcome.text").unwrap();
    assert!(text.starts_with("Hello"));
    assert!(text.contains("Sent with care"));
    assert!(!text.contains("<p>"));

    assert!(!project.file_exists("target/en/welcome.a.subject"));
}

#[tokio::test]
async fn test_batch_wipes_destination() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&welcome("en", "Welcome", "Hello")).unwrap();
    project.create_file("target/en/stale.html", "old").unwrap();

    let (report, _) = render(project.settings()).await;

    assert!(report.success());
    assert!(!project.file_exists("target/en/stale.html"));
    assert!(project.file_exists("target/en/welcome.html"));
}

#[tokio::test]
async fn test_exclusive_filter_keeps_other_output() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&welcome("en", "Welcome", "Hello")).unwrap();
    project.add_source(&welcome("fr", "Bienvenue", "Bonjour")).unwrap();
    project.create_file("target/en/welcome.html", "previous").unwrap();

    let settings = Settings {
        exclusive: Some("fr/*".to_string()),
        ..project.settings()
    };
    let (report, _) = render(settings).await;

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].email.locale, "fr");
    assert_eq!(project.output("en", "welcome.html").unwrap(), "previous");
    assert!(project.file_exists("target/fr/welcome.html"));
}

#[tokio::test]
async fn test_rtl_locale_marks_first_element() {
    let project = TestProject::with_basic_template().unwrap();
    project.add_source(&SourceFixture::global("ar", &[("footer", "مع التحية")])).unwrap();
    project.add_source(&welcome("ar", "مرحبا", "أهلا")).unwrap();
    project.add_source(&welcome("en", "Welcome", "Hello")).unwrap();

    let (report, _) = render(project.settings()).await;

    assert!(report.success());
    assert!(project.output("ar", "welcome.html").unwrap().starts_with("<html dir=\"rtl\">"));
    assert!(project.output("en", "welcome.html").unwrap().starts_with("<html>"));
}

#[tokio::test]
async fn test_variant_selection_and_optional_subjects() {
    let project = TestProject::with_basic_template().unwrap();
    project
        .add_source(&SourceFixture::raw(
            "en",
            "promo",
            r#"<?xml version="1.0" encoding="utf-8"?>
<resources template="basic.html" email_type="transactional">
    <string name="subject">Our offer</string>
    <string name="subject_a">Offer A</string>
    <string name="subject_b">Offer B</string>
    <string-array name="title">
        <item>Hello</item>
        <item variant="B">Howdy</item>
    </string-array>
    <string name="content"><![CDATA[Read more]]></string>
</resources>
"#,
        ))
        .unwrap();

    let settings = Settings {
        variant: Some("B".to_string()),
        ..project.settings()
    };
    let (report, _) = render(settings).await;

    assert!(report.success());
    assert!(project.output("en", "promo.html").unwrap().contains("<h1><p>Howdy</p></h1>"));
    assert_eq!(project.output("en", "promo.a.subject").unwrap(), "Offer A");
    assert_eq!(project.output("en", "promo.b.subject").unwrap(), "Offer B");
    assert!(!project.file_exists("target/en/promo.resend.subject"));
}

#[tokio::test]
async fn test_non_strict_mode_leaves_missing_slots_empty() {
    let project = TestProject::with_basic_template().unwrap();
    project
        .add_source(&SourceFixture::basic("en", "short", &[("subject", "Short"), ("title", "Only a title")]))
        .unwrap();

    let (strict_report, _) = render(project.settings()).await;
    assert!(!strict_report.success());

    let settings = Settings {
        strict: false,
        ..project.settings()
    };
    let (report, _) = render(settings).await;
    assert!(report.success());
    let html = project.output("en", "short.html").unwrap();
    assert!(html.contains("<h1><p>Only a title</p></h1><footer>"));
}
