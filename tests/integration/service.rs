use email_parser::core::EmailError;
use email_parser::service::EmailService;
use email_parser::test_utils::{SourceFixture, TestProject};
use std::collections::BTreeMap;
use std::sync::Arc;

fn project() -> TestProject {
    let project = TestProject::with_basic_template().unwrap();
    project
        .add_source(&SourceFixture::basic(
            "en",
            "welcome",
            &[("subject", "Welcome {{name}}"), ("title", "Hello"), ("content", "Hi {{name}}, see {{link}}")],
        ))
        .unwrap();
    project
        .add_source(&SourceFixture::basic(
            "fr",
            "welcome",
            &[("subject", "Bienvenue {{name}}"), ("title", "Bonjour"), ("content", "Salut {{name}}")],
        ))
        .unwrap();
    project
        .add_source(&SourceFixture::basic("en", "reset", &[("subject", "Reset"), ("title", "Reset"), ("content", "Go")]))
        .unwrap();
    project
}

fn service(project: &TestProject) -> EmailService {
    EmailService::new(Arc::new(project.settings()))
}

#[test]
fn test_email_names() {
    let project = project();
    assert_eq!(service(&project).email_names().unwrap(), vec!["reset", "welcome"]);
}

#[test]
fn test_render_email() {
    let project = project();
    let service = service(&project);

    let rendered = service.render_email("en", "welcome").unwrap().unwrap();
    assert_eq!(rendered.subjects.subject, "Welcome {{name}}");
    assert!(rendered.html.contains("<h1><p>Hello</p></h1>"));

    assert!(service.render_email("de", "welcome").unwrap().is_none());
    assert!(!project.file_exists("target"));
}

#[test]
fn test_render_invalid_email_returns_none_unless_forced() {
    let project = project();
    let service = service(&project);
    service.regenerate_placeholders().unwrap();

    assert!(service.render_email("fr", "welcome").unwrap().is_none());

    let forced = EmailService::new(Arc::new(email_parser::config::Settings {
        force: true,
        ..project.settings()
    }));
    let rendered = forced.render_email("fr", "welcome").unwrap().unwrap();
    assert_eq!(rendered.subjects.subject, "Bienvenue {{name}}");
}

#[test]
fn test_render_with_overrides() {
    let project = project();
    let overrides = BTreeMap::from([("title".to_string(), "Preview".to_string())]);

    let rendered = service(&project).render_with_overrides("en", "reset", &overrides).unwrap().unwrap();
    assert!(rendered.html.contains("<h1><p>Preview</p></h1>"));
    assert!(rendered.text.starts_with("Preview"));
}

#[test]
fn test_missing_subject_is_an_error() {
    let project = project();
    project
        .add_source(&SourceFixture::basic("en", "nosubject", &[("title", "Hello"), ("content", "Body")]))
        .unwrap();

    let result = service(&project).render_email("en", "nosubject");
    assert!(matches!(result, Err(EmailError::MissingSubject { .. })));
}

#[test]
fn test_template_source_and_save() {
    let project = project();
    let service = service(&project);

    let source = service.template_source("en", "reset").unwrap();
    assert!(source.contains("template=\"basic.html\""));
    assert!(matches!(service.template_source("de", "reset"), Err(EmailError::EmailNotFound { .. })));

    let updated = source.replace("Go", "Go {{token}}");
    let path = service.save_template("en", "reset", &updated).unwrap();
    assert_eq!(path, project.path().join("src").join("en").join("reset.xml"));
    assert_eq!(service.template_source("en", "reset").unwrap(), updated);

    let placeholders = service.email_placeholders().unwrap();
    assert_eq!(placeholders["reset"], vec!["token"]);
    assert_eq!(placeholders["welcome"], vec!["link", "name"]);
}

#[test]
fn test_delete_template() {
    let project = project();
    let service = service(&project);

    let mut deleted = service.delete_template("welcome").unwrap();
    deleted.sort();
    assert_eq!(deleted.len(), 2);
    assert!(deleted[0].ends_with("en/welcome.xml"));
    assert!(deleted[1].ends_with("fr/welcome.xml"));
    assert_eq!(service.email_names().unwrap(), vec!["reset"]);

    let config = project.read_file("src/placeholders_config.json").unwrap();
    assert!(config.contains("\"reset\""));
    assert!(!config.contains("\"welcome\""));
}

#[test]
fn test_email_placeholders_without_table() {
    let project = project();
    let placeholders = service(&project).email_placeholders().unwrap();
    assert!(placeholders.values().all(Vec::is_empty));
    assert_eq!(service(&project).placeholders_filepath(), project.path().join("src/placeholders_config.json"));
}
