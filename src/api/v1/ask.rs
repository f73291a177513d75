//! Question answering endpoints

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::{future, stream, Stream, StreamExt};
use tokio_util::sync::DropGuard;
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, AskRequest, Json, StreamEvent};
use crate::infrastructure::services::FragmentStream;

/// POST /v1/ask
///
/// Streams the answer as server-sent events of `{type, content, timestamp}`.
/// Errors found before the first fragment are returned as a JSON error
/// response; errors during generation end the stream with an `error` event.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Response, ApiError> {
    info!(project_id = %request.project_id, "Processing question");

    let (fragments, guard) = start_answer(&state, request).await?;
    let events = answer_events(fragments).map(move |event| {
        // The guard lives as long as the response body.
        let _guard = &guard;
        Event::default().json_data(event)
    });

    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// POST /v1/ask/plain
///
/// Streams the raw answer text.
pub async fn ask_plain(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Response, ApiError> {
    info!(project_id = %request.project_id, "Processing question (plain)");

    let (fragments, guard) = start_answer(&state, request).await?;
    let body = fragments.map(move |fragment| {
        let _guard = &guard;
        fragment.map(Bytes::from)
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}

/// Start answering under a token that is cancelled when the returned guard
/// drops, which happens when the client disconnects.
async fn start_answer(
    state: &AppState,
    request: AskRequest,
) -> Result<(FragmentStream, DropGuard), ApiError> {
    let cancel = state.shutdown.child_token();
    let guard = cancel.clone().drop_guard();

    let fragments = state.answering.answer(request.into(), cancel).await?;
    Ok((fragments, guard))
}

/// Token events for each non-empty fragment, then `complete`, or `error`
/// as the last event when generation fails
fn answer_events(fragments: FragmentStream) -> impl Stream<Item = StreamEvent> + Send {
    let fragments = fragments.filter(|item| future::ready(!matches!(item, Ok(f) if f.is_empty())));

    stream::unfold(Some(Box::pin(fragments)), |state| async move {
        let mut fragments = state?;

        match fragments.next().await {
            Some(Ok(fragment)) => Some((StreamEvent::token(fragment), Some(fragments))),
            Some(Err(e)) => {
                debug!(error = %e, "Answer stream failed");
                Some((StreamEvent::error(e.to_string()), None))
            }
            None => Some((StreamEvent::complete(), None)),
        }
    })
}
