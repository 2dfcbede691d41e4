//! Validation of whole templates against a catalogue.

use std::sync::Arc;

use mail_editor_config::{TemplateCatalogue, TemplateField, TemplateSpec, Variable};
use mail_editor_template::{
    FieldErrorKind, MiniJinjaParser, TemplateContent, TemplateValidator,
};

struct Record {
    template_type: String,
    subject: String,
    body: String,
}

impl Record {
    fn new(template_type: &str, subject: &str, body: &str) -> Self {
        Self {
            template_type: template_type.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

impl TemplateContent for Record {
    fn template_type(&self) -> &str {
        &self.template_type
    }

    fn subject(&self) -> &str {
        &self.subject
    }

    fn body(&self) -> &str {
        &self.body
    }
}

fn validator() -> TemplateValidator {
    let catalogue = TemplateCatalogue::new()
        .with_template(
            "order_shipped",
            TemplateSpec {
                subject: vec![Variable::required("id")],
                body: vec![Variable::required("order"), Variable::new("site")],
                ..Default::default()
            },
        )
        .with_template(
            "newsletter",
            TemplateSpec {
                subject: vec![Variable::new("title")],
                ..Default::default()
            },
        );

    TemplateValidator::new(Arc::new(catalogue), Arc::new(MiniJinjaParser::new()))
}

#[test]
fn test_clean_subject() {
    let record = Record::new("order_shipped", "Hi {{ id }}", "{{ order }}");
    assert!(validator().validate(&record).is_ok());
}

#[test]
fn test_malformed_subject_has_excerpt() {
    let record = Record::new("order_shipped", "Hi {{ id", "{{ order }}");
    let failure = validator().validate(&record).unwrap_err();

    let errors = failure.field_errors(TemplateField::Subject);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, FieldErrorKind::SyntaxError);

    let diagnostic = errors[0].diagnostic.as_ref().unwrap();
    let excerpt = diagnostic.excerpt.as_deref().unwrap();
    assert!(!excerpt.is_empty());
    assert!(excerpt.contains(">>>>"));
}

#[test]
fn test_attribute_path_satisfies_root() {
    let record = Record::new(
        "order_shipped",
        "{{ id }}",
        "<p>Total: {{ order.total }}</p>",
    );
    assert!(validator().validate(&record).is_ok());
}

#[test]
fn test_errors_are_aggregated() {
    let record = Record::new("order_shipped", "{{ id bar }}", "<p>{{ site }}</p>");
    let failure = validator().validate(&record).unwrap_err();

    assert_eq!(failure.len(), 2);
    assert_eq!(
        failure.field_errors(TemplateField::Subject)[0].kind,
        FieldErrorKind::SyntaxError
    );

    let body = failure.field_errors(TemplateField::Body);
    assert_eq!(body[0].kind, FieldErrorKind::Invalid);
    assert_eq!(body[0].missing, vec!["order".to_string()]);
    assert_eq!(
        body[0].message,
        "These variables are required, but missing: {{ order }}"
    );
}

#[test]
fn test_subject_checked_against_subject_variables_only() {
    // `order` is a body variable; using it in the subject does not help the body
    let record = Record::new("order_shipped", "{{ id }} {{ order }}", "nothing here");
    let failure = validator().validate(&record).unwrap_err();

    assert!(failure.field_errors(TemplateField::Subject).is_empty());
    assert_eq!(failure.field_errors(TemplateField::Body).len(), 1);
}

#[test]
fn test_undeclared_variables_allowed() {
    let record = Record::new(
        "order_shipped",
        "{{ id }} {{ anything_else }}",
        "{{ order }} {{ request.user }}",
    );
    assert!(validator().validate(&record).is_ok());
}

#[test]
fn test_optional_variables_not_required() {
    let record = Record::new("newsletter", "Weekly news", "");
    assert!(validator().validate(&record).is_ok());
}

#[test]
fn test_unknown_type_is_not_validated() {
    let record = Record::new("unregistered", "{{ broken", "{% if %}");
    assert!(validator().validate(&record).is_ok());
}
