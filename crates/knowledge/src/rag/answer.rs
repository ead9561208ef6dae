//! Prompt assembly and model invocation.

use std::collections::HashMap;
use std::sync::Arc;

use studybuddy_core::AppResult;
use studybuddy_llm::{ChatMessage, LlmClient, LlmRequest};
use studybuddy_prompt::{build_prompt, PromptDefinition, PromptSet};

use crate::rag::mode::RequestKind;
use crate::vector_index::ScoredChunk;

/// Everything one generation call needs besides the client.
pub struct GenerationInput<'a> {
    pub kind: RequestKind,
    pub question: &'a str,
    /// `None` when no index is installed
    pub retrieved: Option<&'a [ScoredChunk]>,
    /// Pre-rendered `Human:`/`Assistant:` lines
    pub history: &'a str,
}

/// Builds prompts and calls the language model once per request.
pub struct AnswerGenerator {
    llm: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
    prompts: PromptSet,
    institution: String,
}

impl AnswerGenerator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        temperature: f32,
        prompts: PromptSet,
        institution: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            temperature,
            prompts,
            institution: institution.into(),
        }
    }

    /// Build the model request for `input`.
    ///
    /// Question papers always go through the template, with empty context
    /// when there is no index. Conversation without an index sends the bare
    /// question.
    pub fn build_request(&self, input: &GenerationInput<'_>) -> AppResult<LlmRequest> {
        let context = input.retrieved.map(join_context).unwrap_or_default();

        let messages = match (input.kind, input.retrieved) {
            (RequestKind::QuestionPaper, _) => {
                let mut vars = HashMap::new();
                vars.insert("question".to_string(), input.question.to_string());
                vars.insert("context".to_string(), context);
                self.render(&self.prompts.question_paper, vars)?
            }
            (RequestKind::Conversation, Some(_)) => {
                let mut vars = HashMap::new();
                vars.insert("question".to_string(), input.question.to_string());
                vars.insert("context".to_string(), context);
                vars.insert("chat_history".to_string(), input.history.to_string());
                vars.insert("institution".to_string(), self.institution.clone());
                self.render(&self.prompts.conversation, vars)?
            }
            (RequestKind::Conversation, None) => vec![ChatMessage::user(input.question)],
        };

        Ok(LlmRequest::from_messages(messages, self.model.clone())
            .with_temperature(self.temperature))
    }

    fn render(
        &self,
        definition: &PromptDefinition,
        vars: HashMap<String, String>,
    ) -> AppResult<Vec<ChatMessage>> {
        let built = build_prompt(definition, vars)?;
        tracing::debug!(prompt = %built.prompt_id, "Prompt rendered");

        Ok(built
            .parts()
            .map(|(is_system, text)| {
                if is_system {
                    ChatMessage::system(text)
                } else {
                    ChatMessage::user(text)
                }
            })
            .collect())
    }

    /// Build the request and invoke the model. No retries.
    pub async fn generate(&self, input: &GenerationInput<'_>) -> AppResult<String> {
        let request = self.build_request(input)?;

        tracing::info!(
            kind = ?input.kind,
            provider = self.llm.provider_name(),
            model = %self.model,
            "Invoking language model"
        );

        let response = self.llm.complete(&request).await?;
        Ok(response.content)
    }
}

/// Chunk texts in retrieval order, separated by blank lines.
pub fn join_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
