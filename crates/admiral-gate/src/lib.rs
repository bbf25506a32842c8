//! # admiral-gate
//!
//! Blocking question/answer rendezvous between running agents and the
//! human operator at the ADMIRAL dashboard.
//!
//! This crate provides:
//! - [`QuestionGate`] - Bounded mailbox plus one-shot reply slot per question
//! - [`AdmiralQuestion`] / [`AdmiralAnswer`] - The exchanged records
//! - [`AskContext`] - Cancellation and deadline for a single `ask`
//! - [`validate_answer`] - Rules an answer must satisfy before delivery
//! - [`HistoryEntry`] - Append-only audit trail of completed exchanges
//!
//! ## Example
//!
//! ```no_run
//! use admiral_gate::{AdmiralAnswer, AdmiralQuestion, AskContext, QuestionGate};
//!
//! #[tokio::main]
//! async fn main() -> admiral_gate::Result<()> {
//!     let gate = QuestionGate::new(16);
//!     let mut questions = gate.take_questions().expect("first reader");
//!
//!     let asker = gate.clone();
//!     let worker = tokio::spawn(async move {
//!         let question = AdmiralQuestion::builder("Q-1", "Which cache backend?")
//!             .agent("agent-7")
//!             .options(["Redis", "SQLite"])
//!             .build();
//!         asker.ask(AskContext::background(), question).await
//!     });
//!
//!     // UI side
//!     if let Some(question) = questions.next().await {
//!         gate.submit_answer(AdmiralAnswer::selected(&question.id, "Redis"))?;
//!     }
//!
//!     let answer = worker.await.expect("worker task")?;
//!     println!("agent got {:?}", answer.response);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod error;
pub mod gate;
pub mod types;
pub mod validation;

pub use context::{AskContext, CancelHandle};
pub use error::{GateError, Result, ValidationError};
pub use gate::{GateConfig, QuestionGate, QuestionStream};
pub use types::{
    AdmiralAnswer, AdmiralQuestion, AnswerResponse, HistoryEntry, QuestionBuilder, SKIP_SENTINEL,
};
pub use validation::validate_answer;
