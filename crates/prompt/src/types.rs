//! Prompt types for Study Buddy.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition, either built in or loaded from YAML.
///
/// ```yaml
/// id: chat.answer
/// title: Conversational answer
/// apiVersion: "1.0"
/// template: "Current Question: {{question}}"
/// variables: [question]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptDefinition {
    pub id: String,

    pub title: String,

    /// Schema version, `major.minor`
    pub api_version: String,

    #[serde(default)]
    pub created_by: String,

    /// Sent as a system message ahead of the rendered template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Handlebars template for the user message
    pub template: String,

    /// Names the caller has to supply, possibly as empty strings
    #[serde(default)]
    pub variables: Vec<String>,
}

impl PromptDefinition {
    /// First declared variable that `values` does not provide.
    pub fn missing_variable(&self, values: &HashMap<String, String>) -> Option<&str> {
        self.variables
            .iter()
            .map(String::as_str)
            .find(|name| !values.contains_key(*name))
    }
}

/// Rendered system and user text for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub prompt_id: String,
    pub system: Option<String>,
    pub user: String,
}

impl BuiltPrompt {
    /// Message texts in send order: system first when present.
    pub fn parts(&self) -> impl Iterator<Item = (bool, &str)> {
        self.system
            .as_deref()
            .map(|s| (true, s))
            .into_iter()
            .chain(std::iter::once((false, self.user.as_str())))
    }
}
