//! Conversation orchestrator for the Proctor mock-interview service.
//!
//! Given an interview id and an action (`start` or `respond`), decides what
//! message the AI interviewer emits next, whether the interview has concluded,
//! and what score and feedback to persist. The orchestrator is stateless
//! between calls: interview phase is recomputed from the stored message log
//! on every request, never cached.
//!
//! The completion service is an optional collaborator. When it is
//! unconfigured or unreachable, deterministic fallback texts keep the
//! interview able to run to completion.

#![warn(clippy::all)]

pub mod orchestrator;
pub mod prompts;
pub mod provider;

pub use orchestrator::{Orchestrator, TurnOutcome};
pub use provider::{CompletionError, CompletionProvider, OpenAiProvider, Turn};
