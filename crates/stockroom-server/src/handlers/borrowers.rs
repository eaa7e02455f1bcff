use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::borrower::{Borrower, CreateBorrower, UpdateBorrower};
use stockroom_core::{ChangeEvent, BorrowerId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "borrower";

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Json<Vec<Borrower>>> {
    Ok(Json(state.in_workspace(ws, |s, ws| s.borrowers.list(ws)).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateBorrower>,
) -> ApiResult<(StatusCode, Json<Borrower>)> {
    let borrower = state
        .in_workspace(ws, move |s, ws| s.borrowers.create(ws, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&borrower.workspace_id, ENTITY, ChangeAction::Created, &borrower.id)
            .with_data(&borrower),
    );
    Ok(created(borrower))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, BorrowerId)>,
) -> ApiResult<Json<Borrower>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.borrowers.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, BorrowerId)>,
    Json(params): Json<UpdateBorrower>,
) -> ApiResult<Json<Borrower>> {
    let borrower = state
        .in_workspace(ws, move |s, ws| s.borrowers.update(ws, &id, &params))
        .await?;
    state.publish(
        ChangeEvent::new(&borrower.workspace_id, ENTITY, ChangeAction::Updated, &borrower.id)
            .with_data(&borrower),
    );
    Ok(Json(borrower))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, BorrowerId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.borrowers.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}
