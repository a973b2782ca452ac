//! PDF 발주서 텍스트 파서
//!
//! PDF에서 뽑은 텍스트는 표 구조가 깨진 줄 단위 스트림이다.
//! 헤더를 느슨하게 확인한 뒤, 본문 줄을 분류기에 넣어 행을 복원한다.
//!
//! 실패는 던지지 않고 `errors`에 모은다.

use crate::classifier::{classify, split_mixed_line, ParsedRowBuffer};
use crate::matcher::FuzzyMatcher;
use crate::types::{MatchRecord, MatchResult, RawFields};
use serde::Serialize;

/// 이보다 줄이 적으면 파싱하지 않는다
pub const MIN_LINES: usize = 5;

/// 헤더 검사 대상 줄 수
pub const HEADER_LINES: usize = 5;

/// 채워진 필드가 이 수 이상이면 행으로 내보낸다
pub const FLUSH_THRESHOLD: usize = 3;

/// 헤더 필드와 허용 별칭
pub struct HeaderField {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

pub const HEADER_FIELDS: [HeaderField; 5] = [
    HeaderField {
        name: "상품명",
        aliases: &["상품명", "약품명", "제품명"],
    },
    HeaderField {
        name: "표준코드",
        aliases: &["표준코드", "코드"],
    },
    HeaderField {
        name: "판매처",
        aliases: &["판매처", "제조사", "제조업체"],
    },
    HeaderField {
        name: "규격",
        aliases: &["규격"],
    },
    HeaderField {
        name: "총수량",
        aliases: &["총수량", "수량", "주문수량"],
    },
];

/// 파싱 결과 (행과 에러는 서로 독립)
#[derive(Debug, Clone, Default)]
pub struct PdfParseOutcome {
    pub rows: Vec<MatchResult>,
    pub errors: Vec<String>,
}

/// `/match-pdf` 응답 형식
#[derive(Debug, Clone, Serialize)]
pub struct PdfParseResponse {
    pub rows: Vec<MatchRecord>,
    pub errors: Vec<String>,
}

impl PdfParseOutcome {
    fn failed(error: String) -> Self {
        Self {
            rows: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn records(&self) -> Vec<MatchRecord> {
        self.rows.iter().map(MatchResult::to_record).collect()
    }

    pub fn to_response(&self) -> PdfParseResponse {
        PdfParseResponse {
            rows: self.records(),
            errors: self.errors.clone(),
        }
    }
}

/// 앞 5줄 전체에서 필드별 별칭이 하나라도 나오는지 확인
///
/// 줄 단위나 위치는 따지지 않는다. 누락된 필드 이름 목록을 에러로 돌려준다.
pub fn validate_header(lines: &[&str]) -> Result<(), Vec<&'static str>> {
    let header = &lines[..lines.len().min(HEADER_LINES)];
    let missing: Vec<&'static str> = HEADER_FIELDS
        .iter()
        .filter(|field| {
            !header
                .iter()
                .any(|line| field.aliases.iter().any(|alias| line.contains(alias)))
        })
        .map(|field| field.name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

/// PDF 텍스트를 매칭된 행으로 변환
pub fn parse_pdf_text(text: &str, matcher: &FuzzyMatcher) -> PdfParseOutcome {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < MIN_LINES {
        return PdfParseOutcome::failed(format!(
            "PDF 데이터가 너무 적습니다 ({}줄, 최소 {}줄 필요)",
            lines.len(),
            MIN_LINES
        ));
    }

    if let Err(missing) = validate_header(&lines) {
        return PdfParseOutcome::failed(format!(
            "헤더 형식이 맞지 않습니다 (누락: {}): {:?}",
            missing.join(", "),
            &lines[..HEADER_LINES]
        ));
    }

    let mut outcome = PdfParseOutcome::default();
    let mut buffer = ParsedRowBuffer::default();

    for raw_line in &lines[HEADER_LINES..] {
        for segment in split_mixed_line(raw_line) {
            if let Some(kind) = classify(&buffer, &segment) {
                buffer.set(kind, &segment);
            }

            if buffer.populated() >= FLUSH_THRESHOLD {
                let pending = buffer.take();
                match build_row(&pending, matcher) {
                    Ok(row) => outcome.rows.push(row),
                    Err(e) => outcome
                        .errors
                        .push(format!("행 매핑 실패: {} → {}", pending.describe(), e)),
                }
            }
        }
    }

    if !buffer.is_empty() {
        outcome.errors.push(format!(
            "필드가 부족한 마지막 행을 건너뜁니다: {}",
            buffer.describe()
        ));
    }

    outcome
}

fn build_row(buffer: &ParsedRowBuffer, matcher: &FuzzyMatcher) -> Result<MatchResult, String> {
    let name = buffer.name.clone().unwrap_or_default();
    let quantity = buffer
        .quantity
        .as_deref()
        .map(|q| {
            q.parse::<i64>()
                .map_err(|e| format!("수량 변환 실패 ({}): {}", q, e))
        })
        .transpose()?;

    let raw = RawFields {
        standard_code: buffer.code.clone(),
        manufacturer: buffer.manufacturer.clone(),
        spec: buffer.spec.clone(),
    };
    Ok(matcher.match_with_raw(&name, quantity, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CanonicalDrugRecord, MatchDecision};

    fn catalog() -> FuzzyMatcher {
        FuzzyMatcher::new(vec![
            CanonicalDrugRecord {
                id: 1,
                drug_name: "게보린정".to_string(),
                standard_code: "A1".to_string(),
                manufacturer: Some("삼진제약".to_string()),
                ..Default::default()
            },
            CanonicalDrugRecord {
                id: 2,
                drug_name: "타이레놀정500밀리그램".to_string(),
                standard_code: "T1".to_string(),
                ..Default::default()
            },
        ])
    }

    const HEADER: &str = "발주서\n상품명\n표준코드\n판매처\n규격 총수량\n";

    #[test]
    fn test_too_few_lines() {
        let outcome = parse_pdf_text("상품명\n\n표준코드\n   \n", &catalog());
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("너무 적습니다"));
    }

    #[test]
    fn test_header_aliases_in_any_order() {
        let lines = ["주문수량 규격", "제조업체", "기타", "코드", "제품명"];
        assert!(validate_header(&lines).is_ok());
    }

    #[test]
    fn test_header_missing_field() {
        let lines = ["약품명", "표준코드", "제조사", "수량", "비고"];
        assert_eq!(validate_header(&lines), Err(vec!["규격"]));

        let text = "약품명\n표준코드\n제조사\n수량\n비고\n게보린\n8806789012345\n(주)삼진\n";
        let outcome = parse_pdf_text(text, &catalog());
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("규격"));
        assert!(outcome.errors[0].contains("약품명"));
    }

    #[test]
    fn test_header_only_checks_first_five_lines() {
        let lines = ["상품명", "표준코드", "판매처", "비고", "비고", "규격 총수량"];
        assert!(validate_header(&lines).is_err());
    }

    #[test]
    fn test_rows_from_glued_lines() {
        let text = format!(
            "{}게보린정8806789012345\n(주)삼진제약\n타이레놀 500mg\n8801111111111\n20\n",
            HEADER
        );
        let outcome = parse_pdf_text(&text, &catalog());

        assert_eq!(outcome.rows.len(), 2, "errors: {:?}", outcome.errors);
        assert!(outcome.errors.is_empty());

        let first = &outcome.rows[0];
        assert_eq!(first.input_name, "게보린정");
        assert_eq!(first.decision, MatchDecision::Confirmed);
        assert_eq!(first.raw.standard_code.as_deref(), Some("8806789012345"));
        let record = first.to_record();
        assert_eq!(record.standard_code.as_deref(), Some("A1"));
        assert_eq!(record.manufacturer.as_deref(), Some("삼진제약"));

        let second = &outcome.rows[1];
        assert_eq!(second.input_name, "타이레놀 500mg");
        assert_eq!(second.input_quantity, Some(20));
        assert_eq!(second.to_record().standard_code.as_deref(), Some("T1"));
    }

    #[test]
    fn test_unmatched_row_keeps_raw_fields() {
        let text = format!("{}완전히다른약\n8802222222222\n(유)무명상사\n", HEADER);
        let outcome = parse_pdf_text(&text, &catalog());
        assert_eq!(outcome.rows.len(), 1);
        let record = outcome.rows[0].to_record();
        assert_eq!(record.mapped_name, None);
        assert_eq!(record.standard_code.as_deref(), Some("8802222222222"));
        assert_eq!(record.manufacturer.as_deref(), Some("(유)무명상사"));
        assert_eq!(record.mapped, "X");
    }

    #[test]
    fn test_bad_row_does_not_stop_parsing() {
        let text = format!(
            "{}게보린정\n8806789012345\n99999999999999999999999\n타이레놀\n8801111111111\n(주)한국얀센\n",
            HEADER
        );
        let outcome = parse_pdf_text(&text, &catalog());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].input_name, "타이레놀");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("행 매핑 실패"));
    }

    #[test]
    fn test_incomplete_trailing_row_is_reported() {
        let text = format!("{}게보린정\n8806789012345\n(주)삼진제약\n남은약\n", HEADER);
        let outcome = parse_pdf_text(&text, &catalog());
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("남은약"));
    }

    #[test]
    fn test_response_shape() {
        let text = format!("{}게보린정\n8806789012345\n(주)삼진제약\n", HEADER);
        let response = parse_pdf_text(&text, &catalog()).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["rows"][0]["매핑 여부"], "O");
        assert!(json["errors"].as_array().unwrap().is_empty());
    }
}
