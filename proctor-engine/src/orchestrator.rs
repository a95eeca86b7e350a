//! Interview-turn orchestration.
//!
//! Two operations, `start` and `respond`, each appending at least one message.
//! Interview phase is a pure function of the count of AI-authored messages in
//! the store: 0 means awaiting start, 1-6 in progress, 7 completed. Once six
//! AI questions have been asked, the next respond appends the closing
//! assessment as the seventh AI message and persists the score.

use crate::prompts;
use crate::provider::{CompletionProvider, Turn};
use proctor_common::{Error, Result};
use proctor_store::{InterviewStatus, Message, Speaker, SqliteStore};
use serde::Serialize;
use std::sync::Arc;

/// Result of one `respond` turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// The AI interviewer's message for this turn.
    pub message: String,
    /// Signals the caller to transition to the feedback view.
    pub completed: bool,
}

/// The conversation orchestrator. Stateless between calls; the store is the
/// single source of truth.
pub struct Orchestrator {
    store: Arc<SqliteStore>,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl Orchestrator {
    pub fn new(store: Arc<SqliteStore>, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { store, provider }
    }

    /// Open an interview: append the greeting naming the role and the literal
    /// first question, and return its text.
    pub async fn start(&self, interview_id: &str) -> Result<String> {
        let interview = self
            .store
            .get_interview(interview_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("interview {interview_id}")))?;

        let text = prompts::greeting(&interview.role);
        self.store
            .append_message(interview_id, Speaker::Ai, &text)
            .await?;

        tracing::info!(interview_id = %interview_id, role = %interview.role, "Interview started");
        Ok(text)
    }

    /// Advance the interview by one turn with the candidate's answer.
    ///
    /// The answer is persisted first, unconditionally: it must survive even
    /// when the completion service is down. A completion failure is masked by
    /// the deterministic fallback; only store faults abort the turn.
    pub async fn respond(&self, interview_id: &str, user_text: &str) -> Result<TurnOutcome> {
        self.store
            .append_message(interview_id, Speaker::User, user_text)
            .await?;

        let interview = self
            .store
            .get_interview(interview_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("interview {interview_id}")))?;

        if interview.status == InterviewStatus::Completed {
            return Err(Error::InvalidInput(format!(
                "interview {interview_id} is already completed"
            )));
        }

        let history = self.store.list_messages(interview_id).await?;
        let question_count = history
            .iter()
            .filter(|m| m.role == Speaker::Ai)
            .count();
        let should_end = question_count >= prompts::TOTAL_AI_TURNS;

        let directive = if should_end {
            prompts::assessment_directive(&interview.role)
        } else {
            prompts::question_directive(&interview.role, question_count + 1)
        };

        let text = self
            .generate(&directive, &history, question_count, should_end)
            .await;

        self.store
            .append_message(interview_id, Speaker::Ai, &text)
            .await?;

        if should_end {
            let score = prompts::extract_score(&text);
            self.store
                .complete_interview(interview_id, score, &text)
                .await?;
            tracing::info!(interview_id = %interview_id, score, "Interview completed");
        }

        Ok(TurnOutcome {
            message: text,
            completed: should_end,
        })
    }

    /// Produce the AI text for this turn, substituting the deterministic
    /// fallback when the provider is absent or fails.
    async fn generate(
        &self,
        directive: &str,
        history: &[Message],
        question_count: usize,
        should_end: bool,
    ) -> String {
        let fallback = || {
            if should_end {
                prompts::fallback_assessment()
            } else {
                prompts::fallback_followup(question_count + 1)
            }
        };

        let Some(provider) = &self.provider else {
            return fallback();
        };

        let turns: Vec<Turn> = history
            .iter()
            .map(|m| Turn {
                role: m.role.completion_role().to_string(),
                content: m.content.clone(),
            })
            .collect();

        match provider.complete(directive, &turns).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "Completion service failed; using deterministic fallback"
                );
                fallback()
            }
        }
    }
}
