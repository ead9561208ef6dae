//! Index command handler.
//!
//! Loads, chunks and embeds documents, then reports what was indexed.
//! The index lives only for the duration of the command.

use clap::Args;
use std::path::PathBuf;
use studybuddy_core::{config::AppConfig, AppResult};

use crate::session::{open_session, print_failures};

/// Index documents and print batch statistics
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// PDF or text files, or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command for {} path(s)", self.paths.len());

        let mut session = open_session(config, None)?;
        let report = session.process_documents(&self.paths).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_failures(&report);
            println!(
                "Indexed {} file(s), {} document(s), {} chunk(s) ({} dimensions)",
                report.files.len(),
                report.documents,
                report.chunks,
                report.dimensions
            );
            for file in &report.files {
                println!("  {}", file);
            }
        }

        Ok(())
    }
}
