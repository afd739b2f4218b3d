//! Built-in templates plus user templates loaded from managed storage.

use super::{Template, TemplateKind, TemplateVariable};
use crate::store::read_json;
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// The set of templates offered in the "New from template" picker.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Catalog containing only the templates shipped with the application.
    pub fn builtin() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }

    /// Built-in templates plus every valid `*.json` template in `dir`.
    ///
    /// Unreadable or invalid files are skipped with a warning. A user template
    /// whose id matches a built-in one replaces it.
    pub fn load(dir: &Path) -> Self {
        let mut catalog = Self::builtin();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No user templates at {}: {}", dir.display(), e);
                return catalog;
            }
        };

        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension() == Some(OsStr::new("json")))
            .collect();
        paths.sort();

        for path in paths {
            let template = read_json::<Template>(&path)
                .and_then(|template| template.validate().map(|_| template));

            match template {
                Ok(template) => {
                    debug!("Loaded user template '{}' from {:?}", template.id, path);
                    catalog.insert(template);
                }
                Err(e) => warn!("Skipping template {}: {}", path.display(), e),
            }
        }

        catalog
    }

    fn insert(&mut self, template: Template) {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    /// Templates of one kind, in catalog order.
    pub fn of_kind(&self, kind: TemplateKind) -> impl Iterator<Item = &Template> {
        self.templates.iter().filter(move |t| t.kind == kind)
    }

    /// Templates ordered with the given recently-used ids first.
    pub fn ordered_by_recent(&self, recent: &[String]) -> Vec<&Template> {
        let mut ordered: Vec<&Template> = recent.iter().filter_map(|id| self.get(id)).collect();
        ordered.extend(
            self.templates
                .iter()
                .filter(|t| !recent.iter().any(|id| id == &t.id)),
        );
        ordered
    }
}

fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            id: "meeting-notes".to_string(),
            name: "Meeting Notes".to_string(),
            description: "Agenda, attendees and action items".to_string(),
            kind: TemplateKind::Document,
            body: "# {{title}}\n\nDate: {{date}}\nAttendees: {{attendees}}\n\n## Agenda\n\n{{agenda}}\n\n## Action Items\n\n- \n"
                .to_string(),
            variables: vec![
                TemplateVariable::date("date", "2024-01-15"),
                TemplateVariable::text("attendees", "Alice, Bob"),
                TemplateVariable::text("agenda", "Topics to discuss"),
            ],
        },
        Template {
            id: "project-brief".to_string(),
            name: "Project Brief".to_string(),
            description: "One-page summary of a project".to_string(),
            kind: TemplateKind::Document,
            body: "# {{title}}\n\nOwner: {{owner}}\nStatus: {{status}}\nTarget date: {{deadline}}\n\n## Goal\n\n{{goal}}\n"
                .to_string(),
            variables: vec![
                TemplateVariable::text("owner", "Your name"),
                TemplateVariable::choice(
                    "status",
                    "Select status",
                    &["Proposed", "In progress", "On hold", "Done"],
                ),
                TemplateVariable::date("deadline", "2024-06-30"),
                TemplateVariable::text("goal", "What does success look like?"),
            ],
        },
        Template {
            id: "monthly-budget".to_string(),
            name: "Monthly Budget".to_string(),
            description: "Income and expenses with running totals".to_string(),
            kind: TemplateKind::Spreadsheet,
            body: "Budget,{{month}}\nCategory,Amount\nIncome,{{income}}\nRent,{{rent}}\nGroceries,\nUtilities,\nTotal expenses,=SUM(B4:B6)\nBalance,=B3-B7\n"
                .to_string(),
            variables: vec![
                TemplateVariable::text("month", "January"),
                TemplateVariable::number("income", "5000"),
                TemplateVariable::number("rent", "1500"),
            ],
        },
        Template {
            id: "invoice".to_string(),
            name: "Invoice".to_string(),
            description: "Itemized invoice with tax".to_string(),
            kind: TemplateKind::Spreadsheet,
            body: "Invoice,{{invoice_number}}\nClient,{{client}}\nCurrency,{{currency}}\n\nItem,Qty,Price,Total\n,,,=B6*C6\n\nSubtotal,,,=SUM(D6:D6)\nTax,,,=D8*{{tax_rate}}\nTotal,,,=D8+D9\n"
                .to_string(),
            variables: vec![
                TemplateVariable::text("invoice_number", "INV-001"),
                TemplateVariable::text("client", "Client name"),
                TemplateVariable::choice("currency", "Currency", &["USD", "EUR", "GBP"]),
                TemplateVariable::number("tax_rate", "0.2"),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_templates_are_valid() {
        let catalog = TemplateCatalog::builtin();
        assert!(!catalog.all().is_empty());
        for template in catalog.all() {
            assert!(template.validate().is_ok(), "{} is invalid", template.id);
        }
        assert_eq!(catalog.of_kind(TemplateKind::Spreadsheet).count(), 2);
    }

    #[test]
    fn test_load_missing_dir_gives_builtins() {
        let temp = TempDir::new().unwrap();
        let catalog = TemplateCatalog::load(&temp.path().join("nope"));
        assert_eq!(catalog.all().len(), TemplateCatalog::builtin().all().len());
    }

    #[test]
    fn test_load_user_templates_and_skip_invalid() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("letter.json"),
            r#"{"id": "letter", "name": "Letter", "body": "Dear {{to}},", "variables": [{"name": "to"}]}"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("dupe.json"),
            r#"{"id": "dupe", "name": "Dupe", "variables": [{"name": "a"}, {"name": "a"}]}"#,
        )
        .unwrap();
        fs::write(temp.path().join("broken.json"), "{ nope").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let catalog = TemplateCatalog::load(temp.path());
        let letter = catalog.get("letter").unwrap();
        assert_eq!(letter.kind, TemplateKind::Document);
        assert!(catalog.get("dupe").is_none());
        assert_eq!(catalog.all().len(), TemplateCatalog::builtin().all().len() + 1);
    }

    #[test]
    fn test_user_template_replaces_builtin() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("invoice.json"),
            r#"{"id": "invoice", "name": "My Invoice", "kind": "spreadsheet"}"#,
        )
        .unwrap();

        let catalog = TemplateCatalog::load(temp.path());
        assert_eq!(catalog.get("invoice").unwrap().name, "My Invoice");
        assert_eq!(catalog.all().len(), TemplateCatalog::builtin().all().len());
    }

    #[test]
    fn test_ordered_by_recent() {
        let catalog = TemplateCatalog::builtin();
        let recent = vec!["invoice".to_string(), "gone".to_string()];
        let ordered = catalog.ordered_by_recent(&recent);
        assert_eq!(ordered[0].id, "invoice");
        assert_eq!(ordered.len(), catalog.all().len());
    }
}
