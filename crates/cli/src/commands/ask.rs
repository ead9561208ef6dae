//! Ask command handler.
//!
//! One-shot session: index the given files, ask once, print the answer
//! and export question papers.

use clap::Args;
use std::path::PathBuf;
use studybuddy_core::{config::AppConfig, AppError, AppResult};

use crate::session::{export_if_question_paper, index_files, open_session, print_answer};

/// Ask a single question, optionally grounded in documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question or question-paper request
    pub question: String,

    /// Documents to index before asking (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Directory for exported question papers
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let mut session = open_session(config, self.top_k)?;

        if !self.files.is_empty() {
            index_files(&mut session, &self.files).await?;
        }

        let answer = session.ask(&self.question).await?;
        let exported = export_if_question_paper(config, &answer, &self.export_dir)?;

        if self.json {
            let output = serde_json::json!({
                "answer": answer,
                "provider": config.provider,
                "model": config.model,
                "exported": exported,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_answer(&answer);
            for path in &exported {
                eprintln!("Saved {}", path.display());
            }
        }

        match answer.error {
            Some(message) => Err(AppError::Other(message)),
            None => Ok(()),
        }
    }
}
