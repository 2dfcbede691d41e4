//! Preview contexts synthesized from variable examples.

use mail_editor_config::{TemplateField, TemplateSpec, Variable};
use serde_json::{Map, Value};

/// Placeholder value for `variable`: its example, or `--name--`.
pub fn preview_value(variable: &Variable) -> String {
    if variable.example.is_empty() {
        format!("--{}--", variable.name)
    } else {
        variable.example.clone()
    }
}

/// Context object for the variables of one field.
///
/// Dotted names nest: `order.total` becomes `{"order": {"total": ...}}`.
pub fn preview_context(variables: &[Variable]) -> Value {
    let mut root = Map::new();
    for variable in variables {
        let parts: Vec<&str> = variable.name.split('.').collect();
        insert_path(&mut root, &parts, Value::String(preview_value(variable)));
    }
    Value::Object(root)
}

/// `(subject_ctx, body_ctx)` for previewing a template of `spec`.
pub fn preview_contexts(spec: &TemplateSpec) -> (Value, Value) {
    (
        preview_context(spec.variables(TemplateField::Subject)),
        preview_context(spec.variables(TemplateField::Body)),
    )
}

fn insert_path(map: &mut Map<String, Value>, parts: &[&str], value: Value) {
    let Some((head, rest)) = parts.split_first() else {
        return;
    };

    if rest.is_empty() {
        // keep an object built by a deeper path
        if !map.get(*head).is_some_and(Value::is_object) {
            map.insert(head.to_string(), value);
        }
        return;
    }

    let entry = map
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}
