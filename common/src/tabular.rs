//! 엑셀 발주서 행 추출
//!
//! 시트 읽기는 호출 측에서 하고, 여기서는 헤더 위치 결정과
//! `(약품명, 수량)` 추출, 행 단위 매칭만 한다.

use crate::error::{Error, Result};
use crate::matcher::FuzzyMatcher;
use crate::types::MatchResult;

/// 약품명 열로 인정하는 헤더
pub const NAME_HEADERS: &[&str] = &["약품명", "상품명", "제품명", "drug_name"];

/// 수량 열로 인정하는 헤더
pub const QUANTITY_HEADERS: &[&str] = &["수량", "총수량", "주문수량", "quantity"];

/// 시트 셀 값
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// 셀을 문자열로 (빈 셀은 None)
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// 셀을 수량으로 (소수는 반올림)
    pub fn as_quantity(&self) -> Option<i64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_finite() => Some(n.round() as i64),
            Cell::Number(_) => None,
            Cell::Text(s) => {
                let trimmed = s.trim().replace(',', "");
                trimmed
                    .parse::<i64>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.round() as i64))
            }
        }
    }
}

/// 약품명/수량 열 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub quantity: usize,
}

/// 추출된 한 행
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRow {
    pub name: String,
    pub quantity: Option<i64>,
}

/// 헤더를 trim 한 뒤 별칭 목록 순서대로 열을 찾는다
pub fn locate_columns<S: AsRef<str>>(headers: &[S]) -> Result<ColumnMap> {
    let trimmed: Vec<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();
    let find = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| trimmed.iter().position(|h| h == alias))
    };

    let name = find(NAME_HEADERS).ok_or_else(|| Error::MissingColumn(NAME_HEADERS.join("/")))?;
    let quantity =
        find(QUANTITY_HEADERS).ok_or_else(|| Error::MissingColumn(QUANTITY_HEADERS.join("/")))?;

    Ok(ColumnMap { name, quantity })
}

/// 첫 행을 헤더로 보고 나머지 행에서 `(약품명, 수량)`을 뽑는다
///
/// 약품명이 빈 행은 조용히 건너뛴다. 입력 순서를 유지한다.
pub fn extract_rows<I>(mut rows: I) -> Result<Vec<TabularRow>>
where
    I: Iterator<Item = Vec<Cell>>,
{
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells
            .iter()
            .map(|c| c.as_text().unwrap_or_default())
            .collect(),
        None => return Ok(Vec::new()),
    };
    let columns = locate_columns(&header)?;

    let extracted = rows
        .filter_map(|cells| {
            let name = cells.get(columns.name).and_then(Cell::as_text)?;
            let quantity = cells.get(columns.quantity).and_then(Cell::as_quantity);
            Some(TabularRow { name, quantity })
        })
        .collect();

    Ok(extracted)
}

/// 행마다 전체 카탈로그에 대해 매칭
pub fn match_rows(rows: &[TabularRow], matcher: &FuzzyMatcher) -> Vec<MatchResult> {
    rows.iter()
        .map(|row| matcher.match_name(&row.name, row.quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalDrugRecord, MatchDecision};

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_locate_columns_with_padding() {
        let headers = vec!["  번호", " 상품명 ", "수량  "];
        let map = locate_columns(&headers).unwrap();
        assert_eq!(map, ColumnMap { name: 1, quantity: 2 });
    }

    #[test]
    fn test_locate_columns_missing_quantity() {
        let headers = vec!["약품명", "비고"];
        let err = locate_columns(&headers).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_extract_rows_skips_missing_names() {
        let rows = vec![
            vec![text("약품명"), text("수량")],
            vec![text("게보린"), Cell::Number(10.0)],
            vec![Cell::Empty, Cell::Number(3.0)],
            vec![text("   "), Cell::Number(4.0)],
            vec![text("타이레놀"), text("1,200")],
            vec![text("아스피린")],
        ];

        let extracted = extract_rows(rows.into_iter()).unwrap();
        assert_eq!(
            extracted,
            vec![
                TabularRow { name: "게보린".into(), quantity: Some(10) },
                TabularRow { name: "타이레놀".into(), quantity: Some(1200) },
                TabularRow { name: "아스피린".into(), quantity: None },
            ]
        );
    }

    #[test]
    fn test_extract_rows_empty_sheet() {
        let extracted = extract_rows(Vec::<Vec<Cell>>::new().into_iter()).unwrap();
        assert!(extracted.is_empty());
    }

    #[test]
    fn test_match_rows_preserves_order() {
        let matcher = FuzzyMatcher::new(vec![CanonicalDrugRecord {
            id: 1,
            drug_name: "게보린정".to_string(),
            standard_code: "A1".to_string(),
            ..Default::default()
        }]);
        let rows = vec![
            TabularRow { name: "모르는약".into(), quantity: Some(1) },
            TabularRow { name: "게보린".into(), quantity: Some(2) },
        ];

        let results = match_rows(&rows, &matcher);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].input_name, "모르는약");
        assert_eq!(results[1].decision, MatchDecision::Confirmed);
        assert_eq!(results[1].to_record().standard_code.as_deref(), Some("A1"));
    }
}
