use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use stockroom_core::events::ChangeAction;
use stockroom_core::item::{CreateItem, Item, ItemFilter, LowStockItem, UpdateItem};
use stockroom_core::{CategoryId, ChangeEvent, ItemId, Page, PageRequest, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "item";

/// `GET /items` query: filters plus paging.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ItemQuery {
    search: Option<String>,
    category_id: Option<CategoryId>,
    #[serde(default)]
    include_archived: bool,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl ItemQuery {
    fn into_parts(self) -> (ItemFilter, PageRequest) {
        let page = PageRequest::new(self.limit, self.offset);
        let filter = ItemFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            category_id: self.category_id,
            include_archived: self.include_archived,
        };
        (filter, page)
    }
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Query(query): Query<ItemQuery>,
) -> ApiResult<Json<Page<Item>>> {
    let (filter, page) = query.into_parts();
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.items.list(ws, &filter, page))
            .await?,
    ))
}

pub(crate) async fn low_stock(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
) -> ApiResult<Json<Vec<LowStockItem>>> {
    Ok(Json(state.in_workspace(ws, |s, ws| s.items.low_stock(ws)).await?))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = state
        .in_workspace(ws, move |s, ws| s.items.create(ws, &params))
        .await?;
    publish(&state, &item, ChangeAction::Created);
    Ok(created(item))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<Json<Item>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.items.get(ws, &id)).await?))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ItemId)>,
    Json(params): Json<UpdateItem>,
) -> ApiResult<Json<Item>> {
    let item = state
        .in_workspace(ws, move |s, ws| s.items.update(ws, &id, &params))
        .await?;
    publish(&state, &item, ChangeAction::Updated);
    Ok(Json(item))
}

pub(crate) async fn archive(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<Json<Item>> {
    let item = state
        .in_workspace(ws, move |s, ws| s.items.archive(ws, &id))
        .await?;
    publish(&state, &item, ChangeAction::Archived);
    Ok(Json(item))
}

pub(crate) async fn restore(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<Json<Item>> {
    let item = state
        .in_workspace(ws, move |s, ws| s.items.restore(ws, &id))
        .await?;
    publish(&state, &item, ChangeAction::Restored);
    Ok(Json(item))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, ItemId)>,
) -> ApiResult<StatusCode> {
    let (target_ws, target) = (ws.clone(), id.clone());
    state
        .in_workspace(target_ws, move |s, ws| s.delete_item(ws, &target))
        .await?;
    state.publish(ChangeEvent::new(&ws, ENTITY, ChangeAction::Deleted, &id));
    Ok(StatusCode::NO_CONTENT)
}

fn publish(state: &AppState, item: &Item, action: ChangeAction) {
    state.publish(ChangeEvent::new(&item.workspace_id, ENTITY, action, &item.id).with_data(item));
}
