use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::movement::{Movement, RecordMovement};
use stockroom_core::{ChangeEvent, MovementId, Page, WorkspaceId};

use super::{PageQuery, created};
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Movement>>> {
    let page = query.page();
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.movements.list(ws, page))
            .await?,
    ))
}

/// Record a movement by hand. The inventory record itself is not relocated.
pub(crate) async fn record(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<RecordMovement>,
) -> ApiResult<(StatusCode, Json<Movement>)> {
    let movement = state
        .in_workspace(ws, move |s, ws| s.movements.record(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&movement.workspace_id, "movement", ChangeAction::Created, &movement.id)
            .with_data(&movement),
    );
    Ok(created(movement))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, MovementId)>,
) -> ApiResult<Json<Movement>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.movements.get(ws, &id)).await?))
}
