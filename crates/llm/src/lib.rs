//! LLM integration crate for Study Buddy.
//!
//! This crate provides a provider-agnostic abstraction for chat-completion
//! models behind the [`LlmClient`] trait.
//!
//! # Providers
//! - **Groq**: Hosted OpenAI-compatible API (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use studybuddy_llm::{create_client, LlmRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("ollama", None, None, 120)?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
pub use types::ProviderType;
