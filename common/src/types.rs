//! 데이터 모델 정의
//!
//! - CanonicalDrugRecord: 약품 카탈로그 항목 (읽기 전용)
//! - MatchResult / MatchRecord: 매칭 결과와 외부 계약 형식
//! - DropFilePayload / CountingLogEntry / CountingMessage: 카운팅 결과 수집 경로

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 이 점수 미만이면 매칭 실패 (레코드를 반환하지 않는다)
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 70;

/// 이 점수 이상이면 매칭 확정
pub const CONFIRMED_THRESHOLD: u8 = 80;

/// 약품 카탈로그 항목
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDrugRecord {
    pub id: i64,
    pub drug_name: String,
    pub standard_code: String,
    pub product_code: Option<String>,
    pub manufacturer: Option<String>,
    pub image_url: Option<String>,
}

/// 매칭 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchDecision {
    /// score < 70
    Unmatched,
    /// 70 <= score < 80
    LowConfidence,
    /// score >= 80
    Confirmed,
}

impl MatchDecision {
    /// 반올림 전 점수로 판정 (69.8은 70 미만)
    pub fn from_score(score: f64) -> Self {
        if score >= f64::from(CONFIRMED_THRESHOLD) {
            MatchDecision::Confirmed
        } else if score >= f64::from(LOW_CONFIDENCE_THRESHOLD) {
            MatchDecision::LowConfidence
        } else {
            MatchDecision::Unmatched
        }
    }

    /// 외부 계약의 `매핑 여부` 값
    pub fn mapped_flag(&self) -> &'static str {
        match self {
            MatchDecision::Confirmed => "O",
            MatchDecision::LowConfidence | MatchDecision::Unmatched => "X",
        }
    }
}

impl std::fmt::Display for MatchDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchDecision::Unmatched => write!(f, "unmatched"),
            MatchDecision::LowConfidence => write!(f, "low-confidence"),
            MatchDecision::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// PDF 파싱 중 버퍼에 모인 원본 값
///
/// 카탈로그 매칭에 실패했을 때 `표준코드`/`제조사` 대체값으로 쓰인다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub standard_code: Option<String>,
    pub manufacturer: Option<String>,
    pub spec: Option<String>,
}

/// 매칭 결과 (호출마다 생성되는 일시 값)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub input_name: String,
    pub input_quantity: Option<i64>,
    pub matched: Option<CanonicalDrugRecord>,
    /// 출력용 점수 (소수점 이하 버림)
    pub score: u8,
    pub decision: MatchDecision,
    pub raw: RawFields,
}

impl MatchResult {
    /// 외부 계약 형식으로 변환 (카탈로그 값이 원본 값보다 우선)
    pub fn to_record(&self) -> MatchRecord {
        let matched = self.matched.as_ref();
        MatchRecord {
            input_name: self.input_name.clone(),
            input_quantity: self.input_quantity,
            mapped_name: matched.map(|m| m.drug_name.clone()),
            standard_code: matched
                .map(|m| m.standard_code.clone())
                .or_else(|| self.raw.standard_code.clone()),
            product_code: matched.and_then(|m| m.product_code.clone()),
            manufacturer: matched
                .and_then(|m| m.manufacturer.clone())
                .or_else(|| self.raw.manufacturer.clone()),
            image_url: matched.and_then(|m| m.image_url.clone()),
            score: self.score,
            mapped: self.decision.mapped_flag().to_string(),
        }
    }
}

/// 업로드 응답 행 (필드명은 고정된 외부 계약)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "입력 약품명")]
    pub input_name: String,
    #[serde(rename = "입력 수량")]
    pub input_quantity: Option<i64>,
    #[serde(rename = "매핑 약품명")]
    pub mapped_name: Option<String>,
    #[serde(rename = "표준코드")]
    pub standard_code: Option<String>,
    #[serde(rename = "품목일련번호")]
    pub product_code: Option<String>,
    #[serde(rename = "제조사")]
    pub manufacturer: Option<String>,
    #[serde(rename = "약품 이미지")]
    pub image_url: Option<String>,
    #[serde(rename = "유사도 점수")]
    pub score: u8,
    #[serde(rename = "매핑 여부")]
    pub mapped: String,
}

/// 결과 엑셀의 열 순서
pub const MATCH_RECORD_HEADERS: [&str; 9] = [
    "입력 약품명",
    "입력 수량",
    "매핑 약품명",
    "표준코드",
    "품목일련번호",
    "제조사",
    "약품 이미지",
    "유사도 점수",
    "매핑 여부",
];

/// 카운팅 장비가 떨어뜨리는 JSON 파일
#[derive(Debug, Clone, Deserialize)]
pub struct DropFilePayload {
    pub timestamp: String,
    pub drug_name: String,
    pub drug_standard_code: String,
    pub drug_refer_code: String,
    pub count_quantity: QuantityField,
}

/// 정수, 실수, 문자열 어느 쪽으로 와도 받는다
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuantityField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl QuantityField {
    pub fn to_count(&self) -> Result<i64> {
        match self {
            QuantityField::Int(n) => Ok(*n),
            QuantityField::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            QuantityField::Float(f) => Err(Error::InvalidPayload(format!(
                "count_quantity가 정수가 아닙니다: {}",
                f
            ))),
            QuantityField::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                Error::InvalidPayload(format!("count_quantity를 정수로 변환할 수 없습니다: {:?}", s))
            }),
        }
    }
}

impl DropFilePayload {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 문자열 필드를 trim 하고 저장용 엔트리로 변환
    pub fn into_entry(self, source_filename: &str) -> Result<NewCountingLogEntry> {
        let count_quantity = self.count_quantity.to_count()?;
        Ok(NewCountingLogEntry {
            timestamp: self.timestamp.trim().to_string(),
            drug_name: self.drug_name.trim().to_string(),
            drug_standard_code: self.drug_standard_code.trim().to_string(),
            drug_refer_code: self.drug_refer_code.trim().to_string(),
            count_quantity,
            source_filename: source_filename.to_string(),
        })
    }
}

/// 중복 판정 키 (정확히 일치해야 같은 결과로 본다)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub timestamp: String,
    pub drug_standard_code: String,
    pub drug_name: String,
    pub count_quantity: i64,
}

/// 저장 전 카운팅 로그
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCountingLogEntry {
    pub timestamp: String,
    pub drug_name: String,
    pub drug_standard_code: String,
    pub drug_refer_code: String,
    pub count_quantity: i64,
    pub source_filename: String,
}

impl NewCountingLogEntry {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            timestamp: self.timestamp.clone(),
            drug_standard_code: self.drug_standard_code.trim().to_string(),
            drug_name: self.drug_name.trim().to_string(),
            count_quantity: self.count_quantity,
        }
    }

    pub fn with_id(self, id: i64) -> CountingLogEntry {
        CountingLogEntry {
            id,
            timestamp: self.timestamp,
            drug_name: self.drug_name,
            drug_standard_code: self.drug_standard_code,
            drug_refer_code: self.drug_refer_code,
            count_quantity: self.count_quantity,
            source_filename: self.source_filename,
        }
    }
}

/// 저장된 카운팅 로그 (수정/삭제되지 않는다)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingLogEntry {
    pub id: i64,
    pub timestamp: String,
    pub drug_name: String,
    pub drug_standard_code: String,
    pub drug_refer_code: String,
    pub count_quantity: i64,
    pub source_filename: String,
}

impl CountingLogEntry {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            timestamp: self.timestamp.clone(),
            drug_standard_code: self.drug_standard_code.trim().to_string(),
            drug_name: self.drug_name.trim().to_string(),
            count_quantity: self.count_quantity,
        }
    }

    pub fn to_message(&self) -> CountingMessage {
        CountingMessage {
            id: self.id,
            timestamp: self.timestamp.clone(),
            drug_name: self.drug_name.clone(),
            drug_standard_code: self.drug_standard_code.clone(),
            count_quantity: self.count_quantity,
        }
    }
}

/// 구독자에게 푸시되는 메시지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingMessage {
    pub id: i64,
    pub timestamp: String,
    pub drug_name: String,
    pub drug_standard_code: String,
    pub count_quantity: i64,
}
