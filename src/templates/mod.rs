//! Document and spreadsheet templates
//!
//! A template is a body with `{{name}}` placeholders plus the typed variables
//! a user fills in before a new document is created from it.

mod catalog;
mod resolver;

pub use catalog::TemplateCatalog;
pub use resolver::{render, resolve, TemplateFillResult};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// Variables
// ─────────────────────────────────────────────────────────────────────────────

/// Declared input type of a template variable.
///
/// The type only drives which input control is offered; values are always
/// free-form strings and are never coerced or validated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Text,
    Number,
    Date,
    Choice,
}

/// A named, typed placeholder of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Unique within its template; matches `{{name}}` in the body
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariableKind,
    /// Hint shown in an empty input
    #[serde(default)]
    pub placeholder: String,
    /// Offered values, only meaningful for `Choice`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl TemplateVariable {
    pub fn text(name: &str, placeholder: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: VariableKind::Text,
            placeholder: placeholder.to_string(),
            choices: None,
        }
    }

    pub fn number(name: &str, placeholder: &str) -> Self {
        Self {
            kind: VariableKind::Number,
            ..Self::text(name, placeholder)
        }
    }

    pub fn date(name: &str, placeholder: &str) -> Self {
        Self {
            kind: VariableKind::Date,
            ..Self::text(name, placeholder)
        }
    }

    pub fn choice(name: &str, placeholder: &str, choices: &[&str]) -> Self {
        Self {
            kind: VariableKind::Choice,
            choices: Some(choices.iter().map(|c| c.to_string()).collect()),
            ..Self::text(name, placeholder)
        }
    }

    /// The input kind actually offered.
    ///
    /// A `Choice` variable without any choices degrades to free text.
    pub fn input_kind(&self) -> VariableKind {
        match (self.kind, &self.choices) {
            (VariableKind::Choice, Some(choices)) if !choices.is_empty() => VariableKind::Choice,
            (VariableKind::Choice, _) => VariableKind::Text,
            (kind, _) => kind,
        }
    }

    /// Choices to offer, empty unless the input is a choice list.
    pub fn offered_choices(&self) -> &[String] {
        match (self.input_kind(), &self.choices) {
            (VariableKind::Choice, Some(choices)) => choices,
            _ => &[],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Template
// ─────────────────────────────────────────────────────────────────────────────

/// What a template instantiates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Document,
    Spreadsheet,
}

/// A template definition. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: TemplateKind,
    /// Body text with `{{variable}}` placeholders
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

impl Template {
    /// Check the definition invariants: a non-empty id and name, and
    /// non-empty, unique variable names.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("id is empty"));
        }
        if self.name.trim().is_empty() {
            return Err(self.invalid("name is empty"));
        }

        let mut seen = HashSet::new();
        for variable in &self.variables {
            if variable.name.trim().is_empty() {
                return Err(self.invalid("a variable has no name"));
            }
            if !seen.insert(variable.name.as_str()) {
                return Err(self.invalid(&format!(
                    "variable '{}' is declared twice",
                    variable.name
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        }
    }

    /// Look up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn template(variables: Vec<TemplateVariable>) -> Template {
        Template {
            id: "t".to_string(),
            name: "T".to_string(),
            description: String::new(),
            kind: TemplateKind::Document,
            body: String::new(),
            variables,
        }
    }

    #[test]
    fn test_choice_without_choices_degrades_to_text() {
        let mut variable = TemplateVariable::choice("status", "", &[]);
        assert_eq!(variable.input_kind(), VariableKind::Text);
        assert!(variable.offered_choices().is_empty());

        variable.choices = None;
        assert_eq!(variable.input_kind(), VariableKind::Text);
    }

    #[test]
    fn test_choice_with_choices_is_offered() {
        let variable = TemplateVariable::choice("status", "Pick one", &["Draft", "Final"]);
        assert_eq!(variable.input_kind(), VariableKind::Choice);
        assert_eq!(variable.offered_choices(), ["Draft", "Final"]);
    }

    #[test]
    fn test_validate_rejects_duplicate_variables() {
        let t = template(vec![
            TemplateVariable::text("client", ""),
            TemplateVariable::number("client", ""),
        ]);
        let err = t.validate().unwrap_err();
        assert!(matches!(
            &err,
            Error::InvalidTemplate { id, reason } if id == "t" && reason.contains("twice")
        ));
    }

    #[test]
    fn test_validate_rejects_unnamed_variable() {
        let t = template(vec![TemplateVariable::text("  ", "")]);
        assert!(matches!(t.validate(), Err(Error::InvalidTemplate { .. })));

        let mut nameless = template(Vec::new());
        nameless.name = " ".to_string();
        assert_eq!(
            nameless.validate().unwrap_err().to_string(),
            "Invalid template 't': name is empty"
        );
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let t = template(vec![
            TemplateVariable::text("client", "Acme"),
            TemplateVariable::date("due", "2024-01-01"),
        ]);
        assert!(t.validate().is_ok());
        assert!(t.variable("due").is_some());
        assert!(t.variable("missing").is_none());
    }

    #[test]
    fn test_variable_json_uses_type_field() {
        let json = r#"{"name": "size", "type": "choice", "choices": ["S", "M"]}"#;
        let variable: TemplateVariable = serde_json::from_str(json).unwrap();
        assert_eq!(variable.kind, VariableKind::Choice);
        assert_eq!(variable.placeholder, "");
        assert_eq!(variable.input_kind(), VariableKind::Choice);
    }
}
