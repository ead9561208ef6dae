//! Prompt system for Study Buddy.
//!
//! This crate provides structured prompt management with:
//! - Built-in question-paper and conversational prompts
//! - YAML overrides per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use defaults::{builtin_prompt, CONVERSATION_PROMPT_ID, QUESTION_PAPER_PROMPT_ID};
pub use loader::{load_prompt, PromptSet};
pub use types::{BuiltPrompt, PromptDefinition};
