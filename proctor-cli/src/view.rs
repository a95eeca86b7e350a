//! De-duplicating conversation view.
//!
//! The session presenter hears about each turn twice: once as the direct
//! orchestrator response and once over the message event stream. The view
//! tracks seen message ids so every turn renders exactly once, and keeps the
//! transcript in insertion-time order. Direct responses carry no message id,
//! so a turn printed from one is recorded by content and suppressed when its
//! stream echo arrives.

use proctor_store::Message;
use std::collections::HashSet;

#[derive(Default)]
pub struct SessionView {
    seen: HashSet<String>,
    unkeyed: HashSet<String>,
    messages: Vec<Message>,
}

impl SessionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message, returning it only if it has not rendered yet.
    pub fn observe(&mut self, message: Message) -> Option<&Message> {
        if !self.seen.insert(message.id.clone()) {
            return None;
        }

        let already_rendered = self.unkeyed.remove(&message.content);

        // Insert sorted by (created_at, id); events can arrive out of order
        // relative to direct responses.
        let key = (message.created_at, message.id.clone());
        let position = self
            .messages
            .partition_point(|m| (m.created_at, m.id.clone()) <= key);
        self.messages.insert(position, message);

        if already_rendered {
            None
        } else {
            Some(&self.messages[position])
        }
    }

    /// Record a turn rendered from a direct response, which has no id. Its
    /// stream echo will be stored but not re-rendered.
    pub fn observe_unkeyed(&mut self, content: &str) {
        self.unkeyed.insert(content.to_string());
    }

    /// The transcript so far, in insertion-time order.
    pub fn transcript(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use proctor_store::Speaker;

    fn message(id: &str, offset_secs: i64) -> Message {
        Message {
            id: id.to_string(),
            interview_id: "i-1".to_string(),
            role: Speaker::Ai,
            content: format!("content {id}"),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn duplicate_ids_render_once() {
        let mut view = SessionView::new();
        assert!(view.observe(message("m-1", 0)).is_some());
        assert!(view.observe(message("m-1", 0)).is_none());
        assert!(view.observe(message("m-2", 1)).is_some());
        assert_eq!(view.transcript().len(), 2);
    }

    #[test]
    fn late_echo_of_direct_response_is_suppressed() {
        let mut view = SessionView::new();
        view.observe_unkeyed("content m-1");

        // The stream echo is stored in the transcript but not re-rendered.
        assert!(view.observe(message("m-1", 0)).is_none());
        assert_eq!(view.transcript().len(), 1);

        // Only the first echo is suppressed; a distinct message still renders.
        assert!(view.observe(message("m-2", 1)).is_some());
    }

    #[test]
    fn transcript_sorted_by_creation_time() {
        let mut view = SessionView::new();
        view.observe(message("m-3", 30));
        view.observe(message("m-1", 10));
        view.observe(message("m-2", 20));

        let ids: Vec<&str> = view.transcript().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m-1", "m-2", "m-3"]);
    }

    #[test]
    fn ties_break_on_id() {
        let now = Utc::now();
        let mut view = SessionView::new();
        for id in ["m-b", "m-a"] {
            let mut m = message(id, 0);
            m.created_at = now;
            view.observe(m);
        }
        let ids: Vec<&str> = view.transcript().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m-a", "m-b"]);
    }
}
