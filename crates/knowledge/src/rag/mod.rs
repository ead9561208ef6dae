//! Retrieval-augmented answering.

pub mod answer;
pub mod history;
pub mod mode;
pub mod session;
pub mod types;

pub use answer::{join_context, AnswerGenerator, GenerationInput};
pub use history::{ChatHistory, ConversationTurn, TurnRole};
pub use mode::{detect_question_paper_request, RequestKind, QUESTION_PAPER_KEYWORDS};
pub use session::{IndexReport, Session, SessionSettings};
pub use types::{Answer, SourceRef};
