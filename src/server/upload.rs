//! 발주서 업로드 핸들러

use super::error::{ApiError, ApiResult};
use super::SharedState;
use crate::export::{self, ATTACHMENT_NAME, XLSX_CONTENT_TYPE};
use crate::matcher::{self, UploadKind};
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use pharm_inventory_common::{MatchRecord, PdfParseResponse};
use serde_json::{json, Value};

/// 업로드된 `file` 필드
struct UploadedFile {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_file_field(mut multipart: Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();
        tracing::info!(file = ?file_name, size = bytes.len(), "업로드 수신");
        return Ok(UploadedFile { file_name, bytes });
    }
    Err(ApiError::bad_request("file 필드가 없습니다"))
}

fn match_upload(state: &SharedState, upload: UploadedFile) -> ApiResult<Vec<MatchRecord>> {
    let report = matcher::match_bytes(upload.file_name.as_deref(), upload.bytes, state.catalog.as_ref())?;
    for error in &report.errors {
        tracing::warn!(%error, "PDF 파싱 경고");
    }
    Ok(report.records())
}

/// POST /upload → 매핑 결과 엑셀 첨부
pub async fn upload(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let upload = read_file_field(multipart).await?;
    let records = match_upload(&state, upload)?;
    let bytes = export::workbook_bytes(&records)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ATTACHMENT_NAME),
            ),
        ],
        bytes,
    ))
}

/// POST /match-json → 매핑 결과 배열
pub async fn match_json(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ApiResult<Json<Vec<MatchRecord>>> {
    let upload = read_file_field(multipart).await?;
    Ok(Json(match_upload(&state, upload)?))
}

/// POST /match-pdf → `{ rows, errors }`
pub async fn match_pdf(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> ApiResult<Json<PdfParseResponse>> {
    let upload = read_file_field(multipart).await?;
    if UploadKind::detect(upload.file_name.as_deref(), &upload.bytes)? != UploadKind::Pdf {
        return Err(ApiError::bad_request("PDF 파일이 아닙니다"));
    }
    let outcome = matcher::match_pdf(&upload.bytes, state.catalog.as_ref())?;
    Ok(Json(outcome.to_response()))
}

/// POST /save-matched-row → 확인 응답 (행은 로그에만 남긴다)
pub async fn save_matched_row(Json(row): Json<Value>) -> Json<Value> {
    tracing::info!(%row, "매핑 행 확인");
    Json(json!({ "message": "확인 완료" }))
}
