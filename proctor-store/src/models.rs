//! Row types for the interviews and messages collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    InProgress,
    Completed,
}

impl InterviewStatus {
    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parse the storage representation. Unknown values read back as
    /// in-progress rather than failing the whole row.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

/// Author of a message turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Ai,
    User,
}

impl Speaker {
    /// Storage representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::User => "user",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "ai" => Self::Ai,
            _ => Self::User,
        }
    }

    /// Role name used when tagging history for the completion service.
    pub const fn completion_role(&self) -> &'static str {
        match self {
            Self::Ai => "assistant",
            Self::User => "user",
        }
    }
}

/// One end-to-end mock-interview session for a single role.
///
/// Invariant: `score` and `feedback` are non-null if and only if
/// `status == Completed`. Mutated only by the orchestrator's finalize step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub id: String,
    pub role: String,
    pub status: InterviewStatus,
    pub score: Option<i64>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One turn of dialogue, authored by the AI interviewer or the candidate.
///
/// Append-only; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub interview_id: String,
    pub role: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
