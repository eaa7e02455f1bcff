use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::location::{Location, CreateLocation, UpdateLocation};
use stockroom_core::{ChangeEvent, LocationId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "location";

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Json<Vec<Location>>> {
    Ok(Json(state.in_workspace(ws, |s, ws| s.locations.list(ws)).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateLocation>,
) -> ApiResult<(StatusCode, Json<Location>)> {
    let location = state
        .in_workspace(ws, move |s, ws| s.locations.create(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&location.workspace_id, ENTITY, ChangeAction::Created, &location.id)
            .with_data(&location),
    );
    Ok(created(location))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LocationId)>,
) -> ApiResult<Json<Location>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.locations.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LocationId)>,
    Json(params): Json<UpdateLocation>,
) -> ApiResult<Json<Location>> {
    let location = state
        .in_workspace(ws, move |s, ws| s.locations.update(ws, &id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&location.workspace_id, ENTITY, ChangeAction::Updated, &location.id)
            .with_data(&location),
    );
    Ok(Json(location))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LocationId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.locations.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}
