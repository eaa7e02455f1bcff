use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, ETAG};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use stockroom_core::attachment::{DEFAULT_MIME_TYPE, StoredFile, UploadFile};
use stockroom_core::events::ChangeAction;
use stockroom_core::{ChangeEvent, FileId, WorkspaceId};

use super::created;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the client-side file name of an upload.
pub(crate) const FILE_NAME_HEADER: &str = "x-file-name";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Raw request body upload. The size limit is enforced by the router.
pub(crate) async fn upload(
    State(state): State<AppState>,
    Path(ws): Path<WorkspaceId>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<StoredFile>)> {
    let original_name = header_str(&headers, FILE_NAME_HEADER)
        .ok_or_else(|| ApiError::BadRequest("missing X-File-Name header".into()))?
        .to_owned();
    let params = UploadFile {
        original_name,
        mime_type: header_str(&headers, CONTENT_TYPE.as_str()).map(str::to_owned),
    };
    let file = state
        .in_workspace(ws, move |s, ws| s.attachments.upload(ws, &params, &body))
        .await?;
    state.publish(
        ChangeEvent::new(&file.workspace_id, "file", ChangeAction::Created, &file.id)
            .with_data(&file),
    );
    Ok(created(file))
}

pub(crate) async fn download(
    State(state): State<AppState>,
    Path((ws, id)): Path<(WorkspaceId, FileId)>,
) -> ApiResult<Response> {
    let (file, data) = state
        .in_workspace(ws, move |s, ws| s.attachments.download(ws, &id))
        .await?;

    let mut headers = HeaderMap::new();
    let content_type = HeaderValue::from_str(&file.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    let _ = headers.insert(CONTENT_TYPE, content_type);
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&file.original_name)) {
        let _ = headers.insert(CONTENT_DISPOSITION, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("\"{}\"", file.checksum)) {
        let _ = headers.insert(ETAG, value);
    }
    Ok((headers, data).into_response())
}

/// `attachment; filename="..."` with the name reduced to printable ASCII.
fn content_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_escapes_quotes_and_non_ascii() {
        assert_eq!(
            content_disposition("manual \"v2\".pdf"),
            "attachment; filename=\"manual _v2_.pdf\""
        );
        assert_eq!(content_disposition("reçu.png"), "attachment; filename=\"re_u.png\"");
    }

    #[test]
    fn blank_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(FILE_NAME_HEADER, HeaderValue::from_static("  "));
        assert!(header_str(&headers, FILE_NAME_HEADER).is_none());

        let _ = headers.insert(FILE_NAME_HEADER, HeaderValue::from_static(" photo.jpg "));
        assert_eq!(header_str(&headers, FILE_NAME_HEADER), Some("photo.jpg"));
    }
}
