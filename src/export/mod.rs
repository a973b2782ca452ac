//! 매칭 결과 엑셀 출력

use crate::error::{PharmError, Result};
use pharm_inventory_common::export::excel_core::generate_match_workbook;
use pharm_inventory_common::MatchRecord;
use std::path::{Path, PathBuf};

/// `/upload` 응답 첨부 파일명
pub const ATTACHMENT_NAME: &str = "mapped_result.xlsx";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn workbook_bytes(records: &[MatchRecord]) -> Result<Vec<u8>> {
    generate_match_workbook(records).map_err(PharmError::ExcelGeneration)
}

/// 출력 경로 결정
///
/// `output`이 폴더(또는 확장자 없음)면 그 안에 `<입력 파일명>_mapped.xlsx`,
/// 없으면 입력 파일 옆에 같은 이름으로 만든다.
pub fn output_path_for(input: &Path, output: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "mapped_result".to_string());
    let file_name = format!("{}_mapped.xlsx", stem);

    match output {
        Some(out) if out.is_dir() || out.extension().is_none() => out.join(file_name),
        Some(out) => out.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(file_name),
    }
}

pub fn write_workbook(records: &[MatchRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, workbook_bytes(records)?)?;
    Ok(())
}
