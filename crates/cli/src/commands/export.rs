//! Export command handler.

use clap::Args;
use std::path::PathBuf;
use studybuddy_core::{config::AppConfig, AppError, AppResult};
use studybuddy_export::{export_question_paper, ExportHeader};

/// Render an existing question-paper text file to PDF and DOCX
#[derive(Args, Debug)]
pub struct ExportCommand {
    /// Question paper as plain text
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl ExportCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Exporting {}", self.input.display());

        let text = tokio::fs::read_to_string(&self.input).await?;
        if text.trim().is_empty() {
            return Err(AppError::Export(format!(
                "{} contains no text",
                self.input.display()
            )));
        }

        let header = ExportHeader::from(&config.export);
        for path in export_question_paper(&text, &header, &self.out_dir)? {
            println!("{}", path.display());
        }

        Ok(())
    }
}
