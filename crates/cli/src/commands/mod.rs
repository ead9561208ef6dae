//! Command handlers for the Study Buddy CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod export;
pub mod index;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use export::ExportCommand;
pub use index::IndexCommand;
