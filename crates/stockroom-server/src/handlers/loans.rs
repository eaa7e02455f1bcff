use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use stockroom_core::events::ChangeAction;
use stockroom_core::loan::{CreateLoan, ExtendLoan, Loan, LoanFilter};
use stockroom_core::{ChangeEvent, LoanId, WorkspaceId};

use super::created;
use crate::error::ApiResult;
use crate::state::AppState;

const ENTITY: &str = "loan";

/// `?active=true&overdue=true&borrower_id=...`
pub(crate) async fn list(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Query(filter): Query<LoanFilter>,
) -> ApiResult<Json<Vec<Loan>>> {
    Ok(Json(
        state
            .in_workspace(ws, move |s, ws| s.loans.list(ws, &filter))
            .await?,
    ))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    Json(params): Json<CreateLoan>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .in_workspace(ws, move |s, ws| s.loans.create(ws, &params))
        .await?;
    publish(&state, &loan, ChangeAction::Created);
    Ok(created(loan))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LoanId)>,
) -> ApiResult<Json<Loan>> {
    Ok(Json(state.in_workspace(ws, move |s, ws| s.loans.get(ws, &id)).await?))
}

pub(crate) async fn return_loan(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LoanId)>,
) -> ApiResult<Json<Loan>> {
    let loan = state
        .in_workspace(ws, move |s, ws| s.loans.return_loan(ws, &id))
        .await?;
    publish(&state, &loan, ChangeAction::Returned);
    Ok(Json(loan))
}

pub(crate) async fn extend(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, LoanId)>,
    Json(params): Json<ExtendLoan>,
) -> ApiResult<Json<Loan>> {
    let loan = state
        .in_workspace(ws, move |s, ws| s.loans.extend(ws, &id, &params))
        .await?;
    publish(&state, &loan, ChangeAction::Extended);
    Ok(Json(loan))
}

fn publish(state: &AppState, loan: &Loan, action: ChangeAction) {
    state.publish(ChangeEvent::new(&loan.workspace_id, ENTITY, action, &loan.id).with_data(loan));
}
