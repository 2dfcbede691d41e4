//! The template-parsing capability the validator depends on.
//!
//! Any engine can back the validator as long as it can report syntax errors
//! with positions and list the variables a template references.

use std::collections::BTreeSet;
use std::fmt;

use crate::SyntaxDiagnostic;

/// A variable lookup found in a template, e.g. `order.total` is root
/// `order` with path `["total"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableReference {
    root: String,
    path: Vec<String>,
}

impl VariableReference {
    pub fn new(root: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            root: root.into(),
            path,
        }
    }

    /// Parse a dotted reference. Returns `None` for an empty root.
    pub fn parse(dotted: &str) -> Option<Self> {
        let mut parts = dotted.split('.');
        let root = parts.next()?.trim();
        if root.is_empty() {
            return None;
        }
        let path = parts
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Some(Self::new(root, path))
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// The reference written back in dotted form.
    pub fn dotted(&self) -> String {
        let mut dotted = self.root.clone();
        for part in &self.path {
            dotted.push('.');
            dotted.push_str(part);
        }
        dotted
    }

    /// Whether this reference satisfies a requirement for `name`: an exact
    /// match, or attribute access that begins with `name.` (so `order.total`
    /// satisfies both `order` and `order.total`).
    pub fn satisfies(&self, name: &str) -> bool {
        if self.root == name {
            return true;
        }
        let dotted = self.dotted();
        dotted == name
            || dotted
                .strip_prefix(name)
                .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl fmt::Display for VariableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Result of successfully parsing a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
    references: BTreeSet<VariableReference>,
}

impl ParsedTemplate {
    pub fn new(references: impl IntoIterator<Item = VariableReference>) -> Self {
        Self {
            references: references.into_iter().collect(),
        }
    }

    /// Every variable reference, sorted.
    pub fn references(&self) -> impl Iterator<Item = &VariableReference> {
        self.references.iter()
    }

    /// Distinct root names of all references.
    pub fn root_names(&self) -> BTreeSet<&str> {
        self.references.iter().map(|r| r.root_name()).collect()
    }

    /// Whether any reference satisfies a requirement for `name`.
    pub fn satisfies(&self, name: &str) -> bool {
        self.references.iter().any(|r| r.satisfies(name))
    }
}

/// Parses template text for validation.
pub trait TemplateParser: Send + Sync {
    /// Parse `source`, reporting syntax errors with source context.
    fn parse(&self, source: &str) -> Result<ParsedTemplate, SyntaxDiagnostic>;
}
