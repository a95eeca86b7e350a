//! Persistent store for the Proctor mock-interview services.
//!
//! SQLite-backed storage for the `interviews` and `messages` collections,
//! plus a change-subscription primitive delivering newly inserted messages.
//! The store is the single source of truth for conversation state; the
//! ordered message log per interview is the only session record.

#![warn(clippy::all)]

pub mod models;
pub mod sqlite;
pub mod subscription;

pub use models::{Interview, InterviewStatus, Message, Speaker};
pub use sqlite::SqliteStore;
pub use subscription::MessageSubscription;
