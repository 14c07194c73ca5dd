use email_parser::models::{EmailType, Placeholder, PlaceholderType, Placeholders};
use email_parser::service::EmailService;
use email_parser::source::{create_email_content, read_source};
use email_parser::test_utils::{TemplateFixture, TestProject};
use std::sync::Arc;

fn placeholders() -> Placeholders {
    [
        Placeholder::new("subject", "Your receipt"),
        Placeholder::new("content", "Thanks for **shopping**"),
        Placeholder::new("logo", "")
            .with_kind(PlaceholderType::Bitmap)
            .with_attribute("src", "logo.png")
            .with_attribute("alt", "Logo"),
    ]
    .into_iter()
    .map(|p| (p.name.clone(), p))
    .collect()
}

#[test]
fn test_generated_source_renders_with_inlined_styles() {
    let project = TestProject::new().unwrap();
    project
        .add_template(&TemplateFixture::new(
            "styled.html",
            "transactional",
            "<html><body>{{bitmap:logo}}{{content}}</body></html>",
        ))
        .unwrap();
    project.create_file("templates_html/transactional/styled.css", "p { color: red; }").unwrap();

    let xml =
        create_email_content("styled.html", &["styled.css".to_string()], Some(EmailType::Transactional), &placeholders())
            .unwrap();

    let service = EmailService::new(Arc::new(project.settings()));
    let path = service.save_template("en", "receipt", &xml).unwrap();
    assert_eq!(read_source(&path).unwrap().placeholders, placeholders());

    let rendered = service.render_email("en", "receipt").unwrap().unwrap();
    assert_eq!(rendered.subjects.subject, "Your receipt");
    assert!(rendered.html.contains(r#"<p style="color: red">Thanks for <strong>shopping</strong></p>"#));
    assert!(rendered.html.contains(r#"<img alt="Logo" src="http://app.getkeepsafe.com/emails/img/logo.png" />"#));
    assert_eq!(rendered.text, "Thanks for shopping");
}
