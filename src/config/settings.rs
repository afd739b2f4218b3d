//! User settings and preferences for Quire
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Assistant Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the formula / writing assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Model identifier handed to the generation client
    pub model: String,
    /// Whether surrounding sheet/document context is sent with a request
    pub include_context: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            include_context: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// All user-configurable settings.
///
/// Unknown fields are ignored and missing fields fall back to their defaults,
/// so older and newer config files both load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Override for the managed storage root (None = platform data dir)
    pub data_dir: Option<PathBuf>,

    /// Create a welcome document when the document list loads empty
    pub seed_welcome_document: bool,

    /// Whether document search also matches document content
    pub search_document_content: bool,

    /// Assistant settings
    pub ai: AiSettings,

    /// Template ids, most recently used first
    pub recent_templates: Vec<String>,

    /// Maximum number of recent templates to remember
    pub max_recent_templates: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_welcome_document: true,
            search_document_content: true,
            ai: AiSettings::default(),
            recent_templates: Vec::new(),
            max_recent_templates: 10,
        }
    }
}

impl Settings {
    /// Minimum number of remembered templates.
    pub const MIN_RECENT_TEMPLATES: usize = 1;

    /// Maximum number of remembered templates.
    pub const MAX_RECENT_TEMPLATES: usize = 50;

    /// Record a template as most recently used.
    pub fn add_recent_template(&mut self, template_id: &str) {
        self.recent_templates.retain(|id| id != template_id);
        self.recent_templates.insert(0, template_id.to_string());
        self.recent_templates.truncate(self.max_recent_templates);
    }

    /// Clamp values into their valid ranges.
    pub fn sanitize(&mut self) {
        self.max_recent_templates = self
            .max_recent_templates
            .clamp(Self::MIN_RECENT_TEMPLATES, Self::MAX_RECENT_TEMPLATES);
        self.recent_templates.truncate(self.max_recent_templates);

        if self.ai.model.trim().is_empty() {
            self.ai.model = AiSettings::default().model;
        }

        // An empty override means "use the platform default"
        if matches!(&self.data_dir, Some(dir) if dir.as_os_str().is_empty()) {
            self.data_dir = None;
        }
    }

    /// Parse settings from JSON and sanitize the result.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
