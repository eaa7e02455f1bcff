use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::workspace::{CreateWorkspace, UpdateWorkspace, Workspace};
use stockroom_core::{ChangeEvent, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "workspace";

pub(crate) async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Workspace>>> {
    Ok(Json(state.call(|s| s.workspaces.list()).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(params): Json<CreateWorkspace>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let workspace = state.call(move |s| s.workspaces.create(&params)).await?;
    state.publish(
        ChangeEvent::new(&workspace.id, ENTITY, ChangeAction::Created, &workspace.id)
            .with_data(&workspace),
    );
    Ok(created(workspace))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(id): Path<WorkspaceId>,
) -> ApiResult<Json<Workspace>> {
    Ok(Json(state.call(move |s| s.workspaces.get(&id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<WorkspaceId>,
    Json(params): Json<UpdateWorkspace>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state
        .call(move |s| s.workspaces.update(&id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&workspace.id, ENTITY, ChangeAction::Updated, &workspace.id)
            .with_data(&workspace),
    );
    Ok(Json(workspace))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(id): Path<WorkspaceId>,
) -> ApiResult<StatusCode> {
    let target = id.clone();
    state.call(move |s| s.delete_workspace(&target)).await?;
    state.publish(ChangeEvent::new(&id, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}
