//! Server-sent events: one broadcaster subscription per connection.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use stockroom_core::WorkspaceId;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/workspaces/{ws}/events`
///
/// Each change is sent with the SSE `event:` field set to its type
/// (`item.created`) and the JSON event as `data:`. The stream ends when the
/// client disconnects or the server shuts down.
pub(crate) async fn stream(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let workspace_id = ws.clone();
    state.in_workspace(ws, |_, _| Ok(())).await?;

    let subscription = state.broadcaster.subscribe(&workspace_id);
    debug!(workspace_id = %workspace_id, "sse stream opened");

    let events = subscription
        .map(|event| Event::default().event(&event.event_type).json_data(&*event))
        .take_until(state.shutdown.clone().cancelled_owned());

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.config.keepalive())))
}
