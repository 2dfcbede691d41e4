//! Template types and the variables each one expects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A `{{ template variable }}` expected in a subject or body.
///
/// Dotted names such as `order.total` describe attribute access on the root
/// variable `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name as written inside the placeholder.
    #[serde(alias = "variable")]
    pub name: String,
    /// Help text shown to template authors.
    #[serde(default)]
    pub description: String,
    /// Whether the template must reference this variable.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Example value, used to build preview contexts.
    #[serde(default)]
    pub example: String,
}

fn default_required() -> bool {
    true
}

impl Variable {
    /// Create an optional variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            required: false,
            example: String::new(),
        }
    }

    /// Create a required variable.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::new(name)
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the example value.
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// The root variable name (`order` for `order.total`).
    pub fn root_name(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The two editable text fields of a mail template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateField {
    Subject,
    Body,
}

impl TemplateField {
    pub const ALL: [TemplateField; 2] = [TemplateField::Subject, TemplateField::Body];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateField::Subject => "subject",
            TemplateField::Body => "body",
        }
    }
}

impl fmt::Display for TemplateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of one template type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Display name for the type.
    #[serde(default)]
    pub name: String,
    /// What the e-mail is used for.
    #[serde(default)]
    pub description: String,
    /// Subject used when a record is first created.
    #[serde(default)]
    pub subject_default: Option<String>,
    /// Body used when a record is first created.
    #[serde(default)]
    pub body_default: Option<String>,
    /// Base layout the body is embedded in, relative to the templates dir.
    #[serde(default)]
    pub base_template: Option<String>,
    /// Variables governing the subject.
    #[serde(default)]
    pub subject: Vec<Variable>,
    /// Variables governing the body.
    #[serde(default)]
    pub body: Vec<Variable>,
}

impl TemplateSpec {
    /// Variables governing `field`.
    pub fn variables(&self, field: TemplateField) -> &[Variable] {
        match field {
            TemplateField::Subject => &self.subject,
            TemplateField::Body => &self.body,
        }
    }

    /// Names of the required variables of `field`.
    pub fn required_names(&self, field: TemplateField) -> impl Iterator<Item = &str> {
        self.variables(field)
            .iter()
            .filter(|v| v.required)
            .map(|v| v.name.as_str())
    }
}

/// Read-only map of template type to [`TemplateSpec`].
///
/// Loaded once at startup and shared by reference (usually behind an `Arc`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCatalogue {
    specs: BTreeMap<String, TemplateSpec>,
}

impl TemplateCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template type.
    pub fn with_template(mut self, template_type: impl Into<String>, spec: TemplateSpec) -> Self {
        self.specs.insert(template_type.into(), spec);
        self
    }

    pub fn get(&self, template_type: &str) -> Option<&TemplateSpec> {
        self.specs.get(template_type)
    }

    pub fn contains(&self, template_type: &str) -> bool {
        self.specs.contains_key(template_type)
    }

    /// Template types in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateSpec)> {
        self.specs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// `(type, display name)` pairs for selecting a template type.
    ///
    /// The display name falls back to the type key. An empty catalogue
    /// yields a single placeholder choice with an empty key.
    pub fn choices(&self) -> Vec<(String, String)> {
        if self.specs.is_empty() {
            return vec![(String::new(), "No choices are found.".to_string())];
        }

        self.specs
            .iter()
            .map(|(key, spec)| {
                let name = if spec.name.is_empty() {
                    key.clone()
                } else {
                    spec.name.clone()
                };
                (key.clone(), name)
            })
            .collect()
    }
}

impl FromIterator<(String, TemplateSpec)> for TemplateCatalogue {
    fn from_iter<I: IntoIterator<Item = (String, TemplateSpec)>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_deserialize_defaults() {
        let var: Variable = serde_json::from_str(r#"{"name": "id"}"#).unwrap();
        assert!(var.required);
        assert!(var.description.is_empty());

        let var: Variable =
            serde_json::from_str(r#"{"variable": "site", "required": false}"#).unwrap();
        assert_eq!(var.name, "site");
        assert!(!var.required);
    }

    #[test]
    fn test_variable_root_name() {
        assert_eq!(Variable::new("order.total").root_name(), "order");
        assert_eq!(Variable::new("order").root_name(), "order");
    }

    #[test]
    fn test_required_names() {
        let spec = TemplateSpec {
            subject: vec![Variable::required("id"), Variable::new("site")],
            ..Default::default()
        };

        let names: Vec<_> = spec.required_names(TemplateField::Subject).collect();
        assert_eq!(names, vec!["id"]);
        assert_eq!(spec.required_names(TemplateField::Body).count(), 0);
    }

    #[test]
    fn test_choices() {
        assert_eq!(
            TemplateCatalogue::new().choices(),
            vec![(String::new(), "No choices are found.".to_string())]
        );

        let catalogue = TemplateCatalogue::new()
            .with_template(
                "welcome",
                TemplateSpec {
                    name: "Welcome mail".into(),
                    ..Default::default()
                },
            )
            .with_template("activation", TemplateSpec::default());

        assert_eq!(
            catalogue.choices(),
            vec![
                ("activation".to_string(), "activation".to_string()),
                ("welcome".to_string(), "Welcome mail".to_string()),
            ]
        );
    }
}
