//! Turning user input into a finalized template fill, and rendering it.

use super::Template;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// The finalized answer to a template's questions.
///
/// Produced at confirmation time and handed to whatever creates the new
/// document; it is not kept afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFillResult {
    pub title: String,
    /// One entry per declared variable
    pub values: HashMap<String, String>,
}

/// Resolve the user's input against a template.
///
/// A blank title becomes the template name. Every declared variable gets an
/// entry, empty when the user left it out; keys that the template does not
/// declare are dropped. Values are taken as-is, whatever the variable type.
pub fn resolve(
    template: &Template,
    title: &str,
    raw_values: &HashMap<String, String>,
) -> TemplateFillResult {
    let title = if title.trim().is_empty() {
        template.name.clone()
    } else {
        title.to_string()
    };

    let values = template
        .variables
        .iter()
        .map(|variable| {
            let value = raw_values.get(&variable.name).cloned().unwrap_or_default();
            (variable.name.clone(), value)
        })
        .collect();

    TemplateFillResult { title, values }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Substitute `{{name}}` placeholders in the template body.
///
/// `{{title}}` falls back to the resolved title when no variable is called
/// `title`. Placeholders that match nothing are left untouched.
pub fn render(template: &Template, fill: &TemplateFillResult) -> String {
    placeholder_regex()
        .replace_all(&template.body, |caps: &Captures| {
            let name = &caps[1];
            match fill.values.get(name) {
                Some(value) => value.clone(),
                None if name == "title" => fill.title.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
