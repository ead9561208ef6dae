//! Built-in prompt definitions.

use crate::types::PromptDefinition;

/// Prompt used when a request asks for a question paper.
pub const QUESTION_PAPER_PROMPT_ID: &str = "qp.generate";

/// Prompt used for retrieval-augmented conversational answers.
pub const CONVERSATION_PROMPT_ID: &str = "chat.answer";

const QUESTION_PAPER_TEMPLATE: &str = "You are an expert educator. Generate a comprehensive question paper based on the user's request.
Include various types of questions (MCQ, short answer, long answer) with clear instructions.
Format it professionally with proper numbering and sections.

User Request: {{question}}

Context from documents (if available):
{{context}}

Generate a well-structured question paper:";

const CONVERSATION_TEMPLATE: &str = "You are a helpful AI assistant for {{institution}} students.
Answer the question using the context from documents if relevant, otherwise use your general knowledge.
Be friendly, professional, and detailed.

Context from documents:
{{context}}

Chat History:
{{chat_history}}

Current Question: {{question}}

Answer:";

/// Look up a built-in prompt by id.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    let (title, template, variables): (&str, &str, &[&str]) = match id {
        QUESTION_PAPER_PROMPT_ID => (
            "Question paper generation",
            QUESTION_PAPER_TEMPLATE,
            &["question", "context"],
        ),
        CONVERSATION_PROMPT_ID => (
            "Conversational answer",
            CONVERSATION_TEMPLATE,
            &["question", "context", "chat_history", "institution"],
        ),
        _ => return None,
    };

    Some(PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "studybuddy".to_string(),
        system: None,
        template: template.to_string(),
        variables: variables.iter().map(|v| v.to_string()).collect(),
    })
}

/// Ids of every built-in prompt.
pub fn builtin_prompt_ids() -> [&'static str; 2] {
    [QUESTION_PAPER_PROMPT_ID, CONVERSATION_PROMPT_ID]
}
