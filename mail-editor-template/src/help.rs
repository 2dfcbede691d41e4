//! HTML help text listing the variables of a template type.

use mail_editor_config::{TemplateCatalogue, TemplateField, Variable};

use crate::escape::escape_html;

/// `<li>*<b>name</b>: <i>description</i> ("example")</li>`
///
/// The `*` marks required variables; description and example are omitted
/// when empty.
pub fn html_list_item(variable: &Variable) -> String {
    let mut item = String::from("<li>");
    if variable.required {
        item.push('*');
    }
    item.push_str("<b>");
    item.push_str(&escape_html(&variable.name));
    item.push_str("</b>");

    if !variable.description.is_empty() {
        item.push_str(": <i>");
        item.push_str(&escape_html(&variable.description));
        item.push_str("</i>");
    }
    if !variable.example.is_empty() {
        item.push_str(" (\"");
        item.push_str(&escape_html(&variable.example));
        item.push_str("\")");
    }

    item.push_str("</li>");
    item
}

fn html_list(variables: &[Variable]) -> String {
    let items: String = variables.iter().map(html_list_item).collect();
    format!("<ul>{}</ul>", items)
}

/// Help text for `template_type`: the subject variables, then the body
/// variables under a label. Unknown types get empty lists.
pub fn variable_help_text(catalogue: &TemplateCatalogue, template_type: &str) -> String {
    let (subject, body) = catalogue
        .get(template_type)
        .map(|spec| {
            (
                spec.variables(TemplateField::Subject),
                spec.variables(TemplateField::Body),
            )
        })
        .unwrap_or_default();

    format!(
        "{}<br><br><label>Body variables:</label> {}",
        html_list(subject),
        html_list(body),
    )
}
