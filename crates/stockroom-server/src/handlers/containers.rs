use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use stockroom_core::container::{Container, CreateContainer, UpdateContainer};
use stockroom_core::events::ChangeAction;
use stockroom_core::{ChangeEvent, ContainerId, LocationId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "container";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContainerQuery {
    location_id: Option<LocationId>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Query(query): Query<ContainerQuery>,
) -> ApiResult<Json<Vec<Container>>> {
    let containers = state
        .in_workspace(ws, move |s, ws| {
            s.containers.list(ws, query.location_id.as_ref())
        })
        .await?;
    Ok(Json(containers))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateContainer>,
) -> ApiResult<(StatusCode, Json<Container>)> {
    let container = state
        .in_workspace(ws, move |s, ws| s.containers.create(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&container.workspace_id, ENTITY, ChangeAction::Created, &container.id)
            .with_data(&container),
    );
    Ok(created(container))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ContainerId)>,
) -> ApiResult<Json<Container>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.containers.get(ws, &id)).await?))
}

/// Also moves the container when `location_id` is present.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ContainerId)>,
    Json(params): Json<UpdateContainer>,
) -> ApiResult<Json<Container>> {
    let container = state
        .in_workspace(ws, move |s, ws| s.containers.update(ws, &id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&container.workspace_id, ENTITY, ChangeAction::Updated, &container.id)
            .with_data(&container),
    );
    Ok(Json(container))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ContainerId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.containers.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}
