use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use stockroom_core::events::ChangeAction;
use stockroom_core::inventory::{
    CreateInventory, Inventory, InventoryFilter, InventoryStatus, MoveInventory, UpdateInventory,
};
use stockroom_core::movement::Movement;
use stockroom_core::{ChangeEvent, InventoryId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "inventory";

#[derive(Debug, Deserialize)]
pub(crate) struct QuantityRequest {
    quantity: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    status: InventoryStatus,
}

/// Result of a move: the relocated record and the movement it produced.
#[derive(Debug, Serialize)]
pub(crate) struct MoveResponse {
    inventory: Inventory,
    movement: Movement,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Query(filter): Query<InventoryFilter>,
) -> ApiResult<Json<Vec<Inventory>>> {
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.inventory.list(ws, &filter))
            .await?,
    ))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateInventory>,
) -> ApiResult<(StatusCode, Json<Inventory>)> {
    let inventory = state
        .in_workspace(ws, move |s, ws| s.inventory.create(ws, &params))
        .await?;
    publish(&state, &inventory, ChangeAction::Created);
    Ok(created(inventory))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
) -> ApiResult<Json<Inventory>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.inventory.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
    Json(params): Json<UpdateInventory>,
) -> ApiResult<Json<Inventory>> {
    let inventory = state
        .in_workspace(ws, move |s, ws| s.inventory.update(ws, &id, &params))
        .await?;
    publish(&state, &inventory, ChangeAction::Updated);
    Ok(Json(inventory))
}

pub(crate) async fn set_quantity(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
    Json(body): Json<QuantityRequest>,
) -> ApiResult<Json<Inventory>> {
    let inventory = state
        .in_workspace(ws, move |s, ws| s.inventory.set_quantity(ws, &id, body.quantity))
        .await?;
    publish(&state, &inventory, ChangeAction::Updated);
    Ok(Json(inventory))
}

pub(crate) async fn change_status(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<Json<Inventory>> {
    let inventory = state
        .in_workspace(ws, move |s, ws| s.inventory.change_status(ws, &id, body.status))
        .await?;
    publish(&state, &inventory, ChangeAction::Updated);
    Ok(Json(inventory))
}

pub(crate) async fn move_to(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
    Json(params): Json<MoveInventory>,
) -> ApiResult<Json<MoveResponse>> {
    let (inventory, movement) = state
        .in_workspace(ws, move |s, ws| s.inventory.move_to(ws, &id, &params))
        .await?;
    publish(&state, &inventory, ChangeAction::Moved);
    state.publish(
        ChangeEvent::new(&movement.workspace_id, "movement", ChangeAction::Created, &movement.id)
            .with_data(&movement),
    );
    Ok(Json(MoveResponse {
        inventory,
        movement,
    }))
}

pub(crate) async fn archive(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
) -> ApiResult<Json<Inventory>> {
    let inventory = state
        .in_workspace(ws, move |s, ws| s.inventory.archive(ws, &id))
        .await?;
    publish(&state, &inventory, ChangeAction::Archived);
    Ok(Json(inventory))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.inventory.delete(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}

/// Movement history of one record, newest first.
pub(crate) async fn movements(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, InventoryId)>,
) -> ApiResult<Json<Vec<Movement>>> {
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| {
                let _ = s.inventory.get(ws, &id)?;
                s.movements.list_by_inventory(ws, &id)
            })
            .await?,
    ))
}

fn publish(state: &AppState, inventory: &Inventory, action: ChangeAction) {
    state.publish(
        ChangeEvent::new(&inventory.workspace_id, ENTITY, action, &inventory.id)
            .with_data(inventory),
    );
}
