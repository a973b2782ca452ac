use crate::error::{PharmError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use pharm_inventory_common::{extract_rows, Cell, TabularRow};
use std::io::Cursor;

/// 첫 번째 시트의 모든 행을 셀 값으로 읽는다
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| PharmError::SpreadsheetRead(format!("통합 문서 열기 실패: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PharmError::SpreadsheetRead("시트가 없습니다".into()))?
        .map_err(|e| PharmError::SpreadsheetRead(format!("시트 읽기 실패: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(to_cell).collect())
        .collect())
}

/// 발주서 시트에서 `(약품명, 수량)` 행을 뽑는다
pub fn read_order_sheet(bytes: Vec<u8>) -> Result<Vec<TabularRow>> {
    let rows = read_first_sheet(bytes)?;
    Ok(extract_rows(rows.into_iter())?)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(f) => Cell::Number(*f),
        other => Cell::Text(other.to_string()),
    }
}
