//! Change subscription for newly inserted messages.
//!
//! Wraps a broadcast receiver and filters events down to one interview.
//! Delivery is at-most-once per receiver (lagged receivers skip dropped
//! events) and may duplicate what a caller already holds from a direct
//! response, so consumers de-duplicate by message id.

use crate::models::Message;
use tokio::sync::broadcast;

/// Receiver for inserted-message events scoped to a single interview.
///
/// Opened when a session view mounts; dropping it closes the subscription.
pub struct MessageSubscription {
    interview_id: String,
    inner: broadcast::Receiver<Message>,
}

impl MessageSubscription {
    pub(crate) fn new(interview_id: String, inner: broadcast::Receiver<Message>) -> Self {
        Self { interview_id, inner }
    }

    /// The interview this subscription is scoped to.
    pub fn interview_id(&self) -> &str {
        &self.interview_id
    }

    /// Receive the next inserted message for this interview.
    ///
    /// Returns `None` once the store side has been dropped.
    pub async fn recv(&mut self) -> Option<Message> {
        loop {
            match self.inner.recv().await {
                Ok(message) if message.interview_id == self.interview_id => {
                    return Some(message);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        interview_id = %self.interview_id,
                        skipped,
                        "Message subscription lagged; events dropped"
                    );
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
