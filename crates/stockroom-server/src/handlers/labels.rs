use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::label::{Label, CreateLabel, UpdateLabel};
use stockroom_core::{ChangeEvent, ItemId, LabelId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "label";

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(state.in_workspace(ws, |s, ws| s.labels.list(ws)).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateLabel>,
) -> ApiResult<(StatusCode, Json<Label>)> {
    let label = state
        .in_workspace(ws, move |s, ws| s.labels.create(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&label.workspace_id, ENTITY, ChangeAction::Created, &label.id)
            .with_data(&label),
    );
    Ok(created(label))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LabelId)>,
) -> ApiResult<Json<Label>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.labels.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LabelId)>,
    Json(params): Json<UpdateLabel>,
) -> ApiResult<Json<Label>> {
    let label = state
        .in_workspace(ws, move |s, ws| s.labels.update(ws, &id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&label.workspace_id, ENTITY, ChangeAction::Updated, &label.id)
            .with_data(&label),
    );
    Ok(Json(label))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LabelId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.labels.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_for_item(
    State(state): State<AppState>,
    Path((ws, item_id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.labels.list_for_item(ws, &item_id))
            .await?,
    ))
}

/// `PUT`: attaching an already attached label is a no-op that still succeeds.
pub(crate) async fn attach(
    State(state): State<AppState>,
    Path((ws, item_id, label_id)): Path<(WorkspaceId, ItemId, LabelId)>,
) -> ApiResult<Json<Label>> {
    let item = item_id.clone();
    let label = state
        .in_workspace(ws, move |s, ws| s.labels.attach(ws, &item, &label_id))
        .await?;
    state.publish(
        ChangeEvent::new(&label.workspace_id, "item", ChangeAction::LabelAdded, &item_id)
            .with_data(&label),
    );
    Ok(Json(label))
}

pub(crate) async fn detach(
    State(state): State<AppState>,
    Path((ws, item_id, label_id)): Path<(WorkspaceId, ItemId, LabelId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, item, label) = (ws.clone(), item_id.clone(), label_id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.labels.detach(ws, &item, &label))
        .await?;
    state.publish(
        ChangeEvent::new(&ws, "item", ChangeAction::LabelRemoved, &item_id)
            .with_data(&serde_json::json!({ "label_id": label_id })),
    );
    Ok(StatusCode::NO_CONTENT)
}
