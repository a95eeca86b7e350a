//! Server-sent events bridge for the message-insert subscription.
//!
//! Each connected session view gets its own store subscription, scoped to one
//! interview. Events carry the full inserted Message row as JSON with the
//! message id as the SSE event id; delivery may duplicate what the client
//! already received in a direct response, so clients de-duplicate by id.

use crate::routes::{error_response, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures_util::stream::{self, Stream};
use proctor_common::Error;

/// Stream newly inserted messages for one interview.
pub(crate) async fn events_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, (StatusCode, Json<ErrorResponse>)>
{
    state
        .store
        .get_interview(&id)
        .await
        .map_err(|e| error_response(&e))?
        .ok_or_else(|| error_response(&Error::NotFound(format!("interview {id}"))))?;

    let subscription = state.store.subscribe(&id);
    tracing::debug!(interview_id = %id, "Message event stream opened");

    let stream = stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        let event = Event::default()
            .id(message.id.clone())
            .event("message")
            .json_data(&message);
        Some((event, subscription))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
