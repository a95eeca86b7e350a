//! HTTP client for the Proctor API.
//!
//! Covers the orchestrator entry point, the interview session endpoints, and
//! the per-interview SSE message stream. The stream is consumed on a spawned
//! task that forwards parsed `Message` rows over a channel; stream faults end
//! the task with a warning rather than aborting the session.

use anyhow::{anyhow, Result};
use futures_util::StreamExt;
use proctor_store::{Interview, Message};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Default endpoint, matching the server's default bind address.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4500";

/// Orchestrator request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrchestratorRequest<'a> {
    interview_id: &'a str,
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_message: Option<&'a str>,
}

/// Orchestrator response body.
#[derive(Debug, Deserialize)]
pub struct TurnReply {
    pub message: String,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Proctor API HTTP client.
pub struct ProctorClient {
    endpoint: String,
    http: reqwest::Client,
}

impl ProctorClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(150))
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Create a new in-progress interview for the role.
    pub async fn create_interview(&self, role: &str) -> Result<Interview> {
        let url = format!("{}/api/v1/interviews", self.endpoint);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "role": role }))
            .send()
            .await?;
        Self::read_json(response).await
    }

    /// Fetch one interview row.
    pub async fn get_interview(&self, id: &str) -> Result<Interview> {
        let url = format!("{}/api/v1/interviews/{id}", self.endpoint);
        Self::read_json(self.http.get(&url).send().await?).await
    }

    /// List completed interviews, newest first.
    pub async fn history(&self, limit: u32) -> Result<Vec<Interview>> {
        let url = format!("{}/api/v1/interviews?limit={limit}", self.endpoint);
        Self::read_json(self.http.get(&url).send().await?).await
    }

    /// Issue the start action; returns the opening greeting.
    pub async fn start(&self, interview_id: &str) -> Result<TurnReply> {
        self.interview_ai(OrchestratorRequest {
            interview_id,
            action: "start",
            user_message: None,
        })
        .await
    }

    /// Issue one respond action with the candidate's answer.
    pub async fn respond(&self, interview_id: &str, answer: &str) -> Result<TurnReply> {
        self.interview_ai(OrchestratorRequest {
            interview_id,
            action: "respond",
            user_message: Some(answer),
        })
        .await
    }

    async fn interview_ai(&self, request: OrchestratorRequest<'_>) -> Result<TurnReply> {
        let url = format!("{}/api/v1/interview-ai", self.endpoint);
        let response = self.http.post(&url).json(&request).send().await?;
        Self::read_json(response).await
    }

    /// Open the message event stream for one interview. Parsed rows arrive on
    /// the returned channel; the channel closes when the stream ends.
    pub async fn subscribe_messages(
        &self,
        interview_id: &str,
    ) -> Result<mpsc::UnboundedReceiver<Message>> {
        let url = format!(
            "{}/api/v1/interviews/{interview_id}/events",
            self.endpoint
        );
        // Separate client: the stream outlives any per-request timeout.
        let response = reqwest::Client::new().get(&url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("event stream rejected: {}", response.status()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer = String::new();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!(error = %e, "Message event stream interrupted");
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // Events are separated by a blank line.
                while let Some(split) = buffer.find("\n\n") {
                    let frame = buffer[..split].to_string();
                    buffer.drain(..split + 2);
                    if let Some(message) = parse_event_frame(&frame) {
                        if tx.send(message).is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(anyhow!("{status}: {detail}"));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Parse one SSE frame into a message row. Frames without a JSON `data` field
/// (comments, keep-alive pings) yield None.
fn parse_event_frame(frame: &str) -> Option<Message> {
    let data: String = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join("\n");
    if data.is_empty() {
        return None;
    }
    match serde_json::from_str(&data) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping unparsable event frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_store::Speaker;

    #[test]
    fn parse_event_frame_reads_data_line() {
        let frame = concat!(
            "id: m-1\n",
            "event: message\n",
            "data: {\"id\":\"m-1\",\"interview_id\":\"i-1\",\"role\":\"ai\",",
            "\"content\":\"hello\",\"created_at\":\"2026-08-23T10:00:00Z\"}"
        );
        let message = parse_event_frame(frame).unwrap();
        assert_eq!(message.id, "m-1");
        assert_eq!(message.role, Speaker::Ai);
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn parse_event_frame_skips_keepalive() {
        assert!(parse_event_frame(": keep-alive").is_none());
        assert!(parse_event_frame("").is_none());
    }

    #[test]
    fn parse_event_frame_skips_garbage_data() {
        assert!(parse_event_frame("data: not json").is_none());
    }
}
