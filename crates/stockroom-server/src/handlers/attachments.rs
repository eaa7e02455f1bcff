use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::attachment::{Attachment, CreateAttachment, UpdateAttachment};
use stockroom_core::events::ChangeAction;
use stockroom_core::{AttachmentId, ChangeEvent, ItemId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "attachment";

pub(crate) async fn list_for_item(
    State(state): State<AppState>,
    Path((ws, item_id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<Json<Vec<Attachment>>> {
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.attachments.list_for_item(ws, &item_id))
            .await?,
    ))
}

/// Attach an uploaded file (`file_id`) or an `external_ref` to an item.
pub(crate) async fn create(
    State(state): State<AppState>,
    Path((ws, item_id)): Path<(WorkspaceId, ItemId)>,
    Json(params): Json<CreateAttachment>,
) -> ApiResult<(StatusCode, Json<Attachment>)> {
    let attachment = state
        .in_workspace(ws, move |s, ws| s.attachments.create(ws, &item_id, &params))
        .await?;
    publish(&state, &attachment, ChangeAction::Created);
    Ok(created(attachment))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, AttachmentId)>,
) -> ApiResult<Json<Attachment>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.attachments.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, AttachmentId)>,
    Json(params): Json<UpdateAttachment>,
) -> ApiResult<Json<Attachment>> {
    let attachment = state
        .in_workspace(ws, move |s, ws| s.attachments.update(ws, &id, &params))
        .await?;
    publish(&state, &attachment, ChangeAction::Updated);
    Ok(Json(attachment))
}

pub(crate) async fn set_primary(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, AttachmentId)>,
) -> ApiResult<Json<Attachment>> {
    let attachment = state
        .in_workspace(ws, move |s, ws| s.attachments.set_primary(ws, &id))
        .await?;
    publish(&state, &attachment, ChangeAction::PrimarySet);
    Ok(Json(attachment))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, AttachmentId)>,
) -> ApiResult<StatusCode> {
    let attachment = state
        .in_workspace(ws, move |s, ws| s.attachments.delete(ws, &id))
        .await?;
    publish(&state, &attachment, ChangeAction::Deleted);
    Ok(StatusCode::NO_CONTENT)
}

fn publish(state: &AppState, attachment: &Attachment, action: ChangeAction) {
    state.publish(
        ChangeEvent::new(&attachment.workspace_id, ENTITY, action, &attachment.id)
            .with_data(attachment),
    );
}
