use crate::error::{PharmError, Result};
use pharm_inventory_common::{MatchRecord, MatchResult, PdfParseOutcome};
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// 구형 xls (OLE2)
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// 업로드 파일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Spreadsheet,
    Pdf,
}

impl UploadKind {
    /// 매직 바이트를 먼저 보고, 모르면 확장자로 판단
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(PDF_MAGIC) {
            return Ok(UploadKind::Pdf);
        }
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            return Ok(UploadKind::Spreadsheet);
        }

        let ext = file_name
            .and_then(|n| Path::new(n).extension())
            .map(|e| e.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(UploadKind::Pdf),
            Some(e) if SPREADSHEET_EXTENSIONS.contains(&e) => Ok(UploadKind::Spreadsheet),
            _ => Err(PharmError::UnsupportedUpload(
                file_name.unwrap_or("(이름 없음)").to_string(),
            )),
        }
    }
}

/// 파일 하나를 매칭한 결과 (엑셀은 errors가 항상 비어 있다)
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    pub rows: Vec<MatchResult>,
    pub errors: Vec<String>,
}

impl MatchReport {
    pub fn records(&self) -> Vec<MatchRecord> {
        self.rows.iter().map(MatchResult::to_record).collect()
    }

    pub fn confirmed_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.decision == pharm_inventory_common::MatchDecision::Confirmed)
            .count()
    }
}

impl From<PdfParseOutcome> for MatchReport {
    fn from(outcome: PdfParseOutcome) -> Self {
        Self {
            rows: outcome.rows,
            errors: outcome.errors,
        }
    }
}
