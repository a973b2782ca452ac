//! 매칭 결과 엑셀 생성
//!
//! 헤더 한 줄 + 결과 행. 열 순서는 `MATCH_RECORD_HEADERS`를 따른다.

use crate::types::{MatchRecord, MATCH_RECORD_HEADERS};
use rust_xlsxwriter::*;

const SHEET_NAME: &str = "매핑 결과";

/// 열 너비 (문자 수 기준)
const COLUMN_WIDTHS: [f64; 9] = [28.0, 10.0, 28.0, 16.0, 16.0, 20.0, 36.0, 12.0, 10.0];

/// 매칭 결과를 xlsx 바이트로 생성
pub fn generate_match_workbook(records: &[MatchRecord]) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    // 확정되지 않은 행 강조
    let unmatched_format = Format::new().set_font_color(Color::RGB(0xC00000));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| format!("시트 이름 설정 오류: {}", e))?;

    for (col, (header, width)) in MATCH_RECORD_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, width)
            .map_err(|e| format!("열 너비 설정 오류: {}", e))?;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(|e| format!("헤더 쓰기 오류: {}", e))?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        let texts: [(u16, Option<&str>); 6] = [
            (0, Some(record.input_name.as_str())),
            (2, record.mapped_name.as_deref()),
            (3, record.standard_code.as_deref()),
            (4, record.product_code.as_deref()),
            (5, record.manufacturer.as_deref()),
            (6, record.image_url.as_deref()),
        ];
        for (col, value) in texts {
            if let Some(value) = value {
                worksheet
                    .write_string(row, col, value)
                    .map_err(|e| format!("셀 쓰기 오류 ({}, {}): {}", row, col, e))?;
            }
        }

        if let Some(quantity) = record.input_quantity {
            worksheet
                .write_number(row, 1, quantity as f64)
                .map_err(|e| format!("수량 쓰기 오류 ({}): {}", row, e))?;
        }
        worksheet
            .write_number(row, 7, record.score as f64)
            .map_err(|e| format!("점수 쓰기 오류 ({}): {}", row, e))?;

        if record.mapped == "O" {
            worksheet.write_string(row, 8, &record.mapped)
        } else {
            worksheet.write_string_with_format(row, 8, &record.mapped, &unmatched_format)
        }
        .map_err(|e| format!("매핑 여부 쓰기 오류 ({}): {}", row, e))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("엑셀 저장 오류: {}", e))
}
