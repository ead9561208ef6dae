//! Chat command handler.
//!
//! Interactive REPL over one session. Lines starting with `/` are
//! commands; anything else is a question.

use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use studybuddy_core::{config::AppConfig, ApiKey, AppError, AppResult};
use studybuddy_knowledge::{Session, TurnRole};
use studybuddy_llm::ProviderType;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::session::{
    export_if_question_paper, index_files, model_client, open_session, print_answer, print_sources,
};

const HELP: &str =
    "Commands: /upload <path...>, /key, /history, /sources, /files, /reset, /help, /quit";

/// Interactive chat over uploaded documents
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Documents to index before the first question (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Directory for exported question papers
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,
}

/// A parsed REPL line.
#[derive(Debug, PartialEq)]
enum ReplInput {
    Upload(Vec<PathBuf>),
    Key,
    History,
    Sources,
    Files,
    Reset,
    Help,
    Quit,
    Question(String),
    Unknown(String),
    Empty,
}

impl ReplInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        if !line.starts_with('/') {
            return ReplInput::Question(line.to_string());
        }

        let mut parts = split_args(line).into_iter();
        let command = parts.next().unwrap_or_default();
        match command.as_str() {
            "/upload" => ReplInput::Upload(parts.map(PathBuf::from).collect()),
            "/key" => ReplInput::Key,
            "/history" => ReplInput::History,
            "/sources" => ReplInput::Sources,
            "/files" => ReplInput::Files,
            "/reset" => ReplInput::Reset,
            "/help" => ReplInput::Help,
            "/quit" | "/exit" => ReplInput::Quit,
            other => ReplInput::Unknown(other.to_string()),
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting chat session");

        let mut config = config.clone();
        let mut session = open_session(&config, self.top_k)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        if !session.has_llm() {
            self.prompt_for_key(&mut config, &mut session, &mut lines)
                .await?;
        }

        if !self.files.is_empty() {
            if let Err(e) = index_files(&mut session, &self.files).await {
                eprintln!("{}", e);
            }
        }

        println!("Study Buddy ({} / {}). {}", config.provider, config.model, HELP);
        let mut last_answer = None;

        loop {
            prompt("> ");
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match ReplInput::parse(&line) {
                ReplInput::Empty => continue,
                ReplInput::Quit => break,
                ReplInput::Help => println!("{}", HELP),
                ReplInput::Upload(paths) if paths.is_empty() => {
                    println!("Usage: /upload <path...>");
                }
                ReplInput::Upload(paths) => {
                    if let Err(e) = index_files(&mut session, &paths).await {
                        eprintln!("{}", e);
                        if session.has_index() {
                            eprintln!("Keeping the previous index.");
                        }
                    }
                }
                ReplInput::Key => {
                    if let Err(e) = self
                        .prompt_for_key(&mut config, &mut session, &mut lines)
                        .await
                    {
                        eprintln!("{}", e);
                    }
                }
                ReplInput::History => print_history(&session),
                ReplInput::Sources => match &last_answer {
                    Some(answer) => print_sources(answer),
                    None => println!("No answer yet."),
                },
                ReplInput::Files => {
                    if session.processed_files().is_empty() {
                        println!("No documents indexed.");
                    }
                    for file in session.processed_files() {
                        println!("  {}", file);
                    }
                }
                ReplInput::Reset => {
                    session.reset_history();
                    last_answer = None;
                    println!("History cleared.");
                }
                ReplInput::Unknown(command) => {
                    println!("Unknown command {}. {}", command, HELP);
                }
                ReplInput::Question(question) => match session.ask(&question).await {
                    Ok(answer) => {
                        print_answer(&answer);
                        match export_if_question_paper(&config, &answer, &self.export_dir) {
                            Ok(paths) => {
                                for path in paths {
                                    println!("Saved {}", path.display());
                                }
                            }
                            Err(e) => eprintln!("{}", e),
                        }
                        last_answer = Some(answer);
                    }
                    Err(e @ AppError::MissingCredential(_)) => {
                        eprintln!("{}", e);
                        eprintln!("Use /key to enter an API key.");
                    }
                    Err(e) => eprintln!("{}", e),
                },
            }
        }

        tracing::info!(turns = session.history().len(), "Chat session ended");
        Ok(())
    }

    /// Ask for an API key on stdin when the provider needs one.
    async fn prompt_for_key(
        &self,
        config: &mut AppConfig,
        session: &mut Session,
        lines: &mut Lines<BufReader<Stdin>>,
    ) -> AppResult<()> {
        let needs_key = ProviderType::parse(&config.provider)
            .map(|p| p.requires_api_key())
            .unwrap_or(false);
        if !needs_key {
            println!("{} does not use an API key.", config.provider);
            return Ok(());
        }

        prompt(&format!(
            "Enter your {} API key (or set {}): ",
            config.provider,
            config.api_key_env_name()
        ));
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };

        match ApiKey::new(line) {
            Some(key) => {
                config.api_key = Some(key);
                if let Some(client) = model_client(config)? {
                    session.set_llm(client);
                }
            }
            None => eprintln!("No key entered. Use /key to try again."),
        }

        Ok(())
    }
}

/// Split a command line on whitespace, keeping quoted runs together.
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    let mut in_arg = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }

    args
}

fn prompt(text: &str) {
    print!("{}", text);
    std::io::stdout().flush().ok();
}

fn print_history(session: &Session) {
    if session.history().is_empty() {
        println!("No messages yet.");
        return;
    }
    for turn in session.history() {
        let speaker = match turn.role {
            TurnRole::User => "You",
            TurnRole::Assistant => "Assistant",
        };
        println!("{}: {}", speaker, turn.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplInput::parse("  "), ReplInput::Empty);
        assert_eq!(ReplInput::parse("/quit"), ReplInput::Quit);
        assert_eq!(ReplInput::parse("/history"), ReplInput::History);
        assert_eq!(
            ReplInput::parse("/upload a.pdf notes/b.txt"),
            ReplInput::Upload(vec![PathBuf::from("a.pdf"), PathBuf::from("notes/b.txt")])
        );
        assert_eq!(ReplInput::parse("/bogus"), ReplInput::Unknown("/bogus".to_string()));
        assert_eq!(ReplInput::parse("/key"), ReplInput::Key);
        assert!(HELP.contains("/key"));
    }

    #[test]
    fn test_parse_upload_quoted_paths() {
        assert_eq!(
            ReplInput::parse(r#"/upload "my notes.pdf" 'unit 2/os.txt' plain.txt"#),
            ReplInput::Upload(vec![
                PathBuf::from("my notes.pdf"),
                PathBuf::from("unit 2/os.txt"),
                PathBuf::from("plain.txt"),
            ])
        );
    }

    #[test]
    fn test_parse_question() {
        assert_eq!(
            ReplInput::parse(" What is a deadlock? "),
            ReplInput::Question("What is a deadlock?".to_string())
        );
    }
}
