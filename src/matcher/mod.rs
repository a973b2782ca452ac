//! 업로드 매칭 서비스
//!
//! 파일 종류를 판별해 엑셀/PDF 경로로 나누고, 요청마다 카탈로그 전체를 읽어 매칭한다.

mod types;

pub use types::{MatchReport, UploadKind};

use crate::error::{PharmError, Result};
use crate::reader;
use crate::store::Catalog;
use pharm_inventory_common::{match_rows, parse_pdf_text, FuzzyMatcher, MatchResult, PdfParseOutcome};
use std::path::Path;

pub fn build_matcher(catalog: &dyn Catalog) -> Result<FuzzyMatcher> {
    let records = catalog.list_all()?;
    tracing::debug!(catalog_size = records.len(), "카탈로그 로드");
    Ok(FuzzyMatcher::new(records))
}

/// 엑셀 발주서 매칭 (입력 행 순서 유지)
pub fn match_spreadsheet(bytes: Vec<u8>, catalog: &dyn Catalog) -> Result<Vec<MatchResult>> {
    let rows = reader::read_order_sheet(bytes)?;
    let matcher = build_matcher(catalog)?;
    let results = match_rows(&rows, &matcher);
    tracing::info!(rows = results.len(), "엑셀 매칭 완료");
    Ok(results)
}

/// PDF 발주서 매칭
///
/// 텍스트 추출 실패만 에러로 돌려주고, 형식 문제는 결과의 `errors`에 담긴다.
pub fn match_pdf(bytes: &[u8], catalog: &dyn Catalog) -> Result<PdfParseOutcome> {
    let text = reader::extract_pdf_text(bytes)?;
    let matcher = build_matcher(catalog)?;
    let outcome = parse_pdf_text(&text, &matcher);
    tracing::info!(
        rows = outcome.rows.len(),
        errors = outcome.errors.len(),
        "PDF 매칭 완료"
    );
    Ok(outcome)
}

pub fn match_bytes(file_name: Option<&str>, bytes: Vec<u8>, catalog: &dyn Catalog) -> Result<MatchReport> {
    match UploadKind::detect(file_name, &bytes)? {
        UploadKind::Spreadsheet => Ok(MatchReport {
            rows: match_spreadsheet(bytes, catalog)?,
            errors: Vec::new(),
        }),
        UploadKind::Pdf => Ok(match_pdf(&bytes, catalog)?.into()),
    }
}

/// 로컬 파일 매칭 (CLI용)
pub fn match_file(path: &Path, catalog: &dyn Catalog) -> Result<MatchReport> {
    if !path.exists() {
        return Err(PharmError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
    match_bytes(file_name.as_deref(), bytes, catalog)
}
