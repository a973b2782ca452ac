//! 업로드 파일 읽기
//!
//! - [`spreadsheet`]: xlsx/xls 첫 시트 → 셀 행
//! - [`pdf`]: PDF → 줄 단위 텍스트

pub mod pdf;
pub mod spreadsheet;

pub use pdf::extract_pdf_text;
pub use spreadsheet::{read_first_sheet, read_order_sheet};
