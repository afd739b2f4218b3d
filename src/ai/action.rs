//! Assistant actions and the prompts sent for each.

use serde::{Deserialize, Serialize};

/// What the user asked the assistant to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAction {
    /// Describe a calculation in words, get a formula back
    GenerateFormula,
    /// Explain an existing formula in prose
    ExplainFormula,
    /// Repair a formula that errors or gives the wrong result
    FixFormula,
    /// Summarize selected document text
    Summarize,
    /// Rewrite selected document text more clearly
    ImproveWriting,
}

/// A prompt ready to hand to a generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub action: AiAction,
    pub system: String,
    pub user: String,
}

const FORMULA_OUTPUT_RULES: &str = "OUTPUT FORMAT:
- First line: the formula only, starting with \"=\". No label, no code block.
- Then a blank line, then a short plain-text explanation.
- Use A1 references and standard spreadsheet functions.
- Propose exactly one formula.";

impl AiAction {
    pub fn all() -> &'static [AiAction] {
        &[
            AiAction::GenerateFormula,
            AiAction::ExplainFormula,
            AiAction::FixFormula,
            AiAction::Summarize,
            AiAction::ImproveWriting,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            AiAction::GenerateFormula => "Generate formula",
            AiAction::ExplainFormula => "Explain formula",
            AiAction::FixFormula => "Fix formula",
            AiAction::Summarize => "Summarize",
            AiAction::ImproveWriting => "Improve writing",
        }
    }

    /// Whether the response starts with a formula segment.
    pub fn expects_formula(&self) -> bool {
        matches!(self, AiAction::GenerateFormula | AiAction::FixFormula)
    }

    pub fn system_prompt(&self) -> String {
        match self {
            AiAction::GenerateFormula => format!(
                "You are a spreadsheet assistant. Write a formula that does what the user describes.\n\n{}",
                FORMULA_OUTPUT_RULES
            ),
            AiAction::FixFormula => format!(
                "You are a spreadsheet assistant. The user's formula is broken or gives the wrong result. \
                 Return a corrected formula and say what was wrong.\n\n{}",
                FORMULA_OUTPUT_RULES
            ),
            AiAction::ExplainFormula => "You are a spreadsheet assistant. Explain what the given formula \
                 computes, step by step, in plain language. Do not repeat the formula on its own line."
                .to_string(),
            AiAction::Summarize => "You are a writing assistant. Summarize the given text in a few \
                 sentences, keeping names, numbers and dates."
                .to_string(),
            AiAction::ImproveWriting => "You are a writing assistant. Rewrite the given text to be clearer \
                 and more concise without changing its meaning. Reply with the rewritten text only."
                .to_string(),
        }
    }

    /// Build the request for `input`, with optional surrounding `context`
    /// (nearby cells, document excerpt). Blank context is omitted.
    pub fn request(&self, input: &str, context: &str) -> GenerationRequest {
        let subject = match self {
            AiAction::GenerateFormula => "Request",
            AiAction::ExplainFormula | AiAction::FixFormula => "Formula",
            AiAction::Summarize | AiAction::ImproveWriting => "Text",
        };

        let mut user = format!("{}:\n{}", subject, input.trim());
        if !context.trim().is_empty() {
            user.push_str("\n\nContext:\n");
            user.push_str(context.trim());
        }

        GenerationRequest {
            action: *self,
            system: self.system_prompt(),
            user,
        }
    }
}
