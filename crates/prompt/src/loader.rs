//! Prompt loader.
//!
//! Workspace overrides live in `.studybuddy/prompts/<id>.yml`. When no
//! override exists the built-in definition is used.

use crate::defaults::{builtin_prompt, CONVERSATION_PROMPT_ID, QUESTION_PAPER_PROMPT_ID};
use crate::types::PromptDefinition;
use std::path::Path;
use studybuddy_core::{AppError, AppResult};

/// Load a prompt definition by ID.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.studybuddy/`
/// * `prompt_id` - Prompt identifier (e.g., "chat.answer")
///
/// # Example
/// ```no_run
/// use studybuddy_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "qp.generate")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".studybuddy/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("No override at {:?}, using built-in prompt", prompt_file);
        return builtin_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition, prompt_id)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// The two prompts the answer generator needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub question_paper: PromptDefinition,
    pub conversation: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        let missing = |id: &str| AppError::Prompt(format!("Missing built-in prompt: {}", id));
        Ok(Self {
            question_paper: builtin_prompt(QUESTION_PAPER_PROMPT_ID)
                .ok_or_else(|| missing(QUESTION_PAPER_PROMPT_ID))?,
            conversation: builtin_prompt(CONVERSATION_PROMPT_ID)
                .ok_or_else(|| missing(CONVERSATION_PROMPT_ID))?,
        })
    }

    /// Built-in prompts with workspace overrides applied.
    pub fn load(workspace_path: &Path) -> AppResult<Self> {
        Ok(Self {
            question_paper: load_prompt(workspace_path, QUESTION_PAPER_PROMPT_ID)?,
            conversation: load_prompt(workspace_path, CONVERSATION_PROMPT_ID)?,
        })
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition, expected_id: &str) -> AppResult<()> {
    if def.id != expected_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            expected_id, def.id
        )));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
