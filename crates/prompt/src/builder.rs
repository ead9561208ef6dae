//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use std::collections::HashMap;
use studybuddy_core::{AppError, AppResult};

/// Build a prompt from a definition and input variables.
///
/// Every name listed in `definition.variables` must be present in
/// `variables`. An empty value is allowed (e.g. no retrieved context).
///
/// # Example
/// ```no_run
/// use studybuddy_prompt::{build_prompt, builtin_prompt, CONVERSATION_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(CONVERSATION_PROMPT_ID).expect("builtin");
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is a semaphore?".to_string());
/// vars.insert("context".to_string(), String::new());
/// vars.insert("chat_history".to_string(), String::new());
/// vars.insert("institution".to_string(), "IIIT Sri City".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if let Some(missing) = definition.missing_variable(&variables) {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' requires variable '{}'",
            definition.id, missing
        )));
    }

    let user = render_template(&definition.template, &variables)?;

    let system = match definition.system {
        Some(ref system) => Some(render_template(system, &variables)?),
        None => None,
    };

    Ok(BuiltPrompt {
        prompt_id: definition.id.clone(),
        system,
        user,
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(template: &str, variables: &[&str]) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: None,
            template: template.to_string(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "a < b && c > d".to_string());

        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "a < b && c > d");
    }

    #[test]
    fn test_build_prompt() {
        let def = definition("Context:\n{{context}}\n\nQ: {{question}}", &["context", "question"]);
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), String::new());
        vars.insert("question".to_string(), "Why?".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Context:\n\n\nQ: Why?");
        assert!(built.system.is_none());
        assert_eq!(built.prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_missing_variable() {
        let def = definition("Q: {{question}}", &["question"]);
        let result = build_prompt(&def, HashMap::new());
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_system_message_is_rendered() {
        let mut def = definition("{{question}}", &["question"]);
        def.system = Some("You help {{institution}} students.".to_string());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "q".to_string());
        vars.insert("institution".to_string(), "Test U".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.system.as_deref(), Some("You help Test U students."));
    }
}
