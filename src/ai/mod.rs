//! Spreadsheet formula and writing assistant
//!
//! The assistant talks to an injected [`GenerationClient`]; this module owns
//! the prompts, the cancel/supersede rules for token streams, the popover
//! session that accumulates a response, and the parser that splits a
//! response into a formula and its explanation.

mod action;
mod parser;
mod service;
mod session;

pub use action::{AiAction, GenerationRequest};
pub use parser::{parse_explanation, parse_formula, AIResponseSegments};
pub use service::{AiService, GenerationClient, ScriptedClient, TokenStream};
pub use session::{AssistantSession, SessionPhase};
