use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::category::{Category, CreateCategory, UpdateCategory};
use stockroom_core::{ChangeEvent, CategoryId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "category";

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.in_workspace(ws, |s, ws| s.categories.list(ws)).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state
        .in_workspace(ws, move |s, ws| s.categories.create(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&category.workspace_id, ENTITY, ChangeAction::Created, &category.id)
            .with_data(&category),
    );
    Ok(created(category))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, CategoryId)>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.categories.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, CategoryId)>,
    Json(params): Json<UpdateCategory>,
) -> ApiResult<Json<Category>> {
    let category = state
        .in_workspace(ws, move |s, ws| s.categories.update(ws, &id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&category.workspace_id, ENTITY, ChangeAction::Updated, &category.id)
            .with_data(&category),
    );
    Ok(Json(category))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, CategoryId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.categories.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}
