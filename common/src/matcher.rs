//! 카탈로그 유사도 매칭
//!
//! 카탈로그 스냅샷마다 `(정규화 키, 레코드)` 쌍을 한 번 만들어 두고,
//! 입력명과 각 키의 유사도(0-100)를 계산해 최고점을 고른다.
//!
//! 동점이면 카탈로그 id가 가장 작은 레코드를 고른다.

use crate::normalizer::normalize;
use crate::types::{CanonicalDrugRecord, MatchDecision, MatchResult, RawFields};

/// 정규화 키가 미리 계산된 후보
#[derive(Debug, Clone)]
struct Candidate {
    key: String,
    record: CanonicalDrugRecord,
}

/// 카탈로그 스냅샷에 대한 매처
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    candidates: Vec<Candidate>,
}

impl FuzzyMatcher {
    pub fn new(catalog: Vec<CanonicalDrugRecord>) -> Self {
        let candidates = catalog
            .into_iter()
            .map(|record| Candidate {
                key: normalize(&record.drug_name),
                record,
            })
            .collect();
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// 최고점 후보와 점수 (임계값 적용 전, 0-100 실수)
    pub fn best_candidate(&self, input_name: &str) -> Option<(&CanonicalDrugRecord, f64)> {
        let key = normalize(input_name);
        if key.is_empty() {
            return None;
        }

        let mut best: Option<(&CanonicalDrugRecord, f64)> = None;
        for candidate in &self.candidates {
            let score = similarity(&key, &candidate.key);
            best = match best {
                Some((record, best_score))
                    if best_score > score
                        || (best_score == score && record.id <= candidate.record.id) =>
                {
                    Some((record, best_score))
                }
                _ => Some((&candidate.record, score)),
            };
        }
        best
    }

    /// 입력명을 매칭하고 판정을 붙인다
    ///
    /// 70점 미만이면 후보가 있어도 `matched`는 `None`.
    pub fn match_name(&self, input_name: &str, input_quantity: Option<i64>) -> MatchResult {
        self.match_with_raw(input_name, input_quantity, RawFields::default())
    }

    pub fn match_with_raw(
        &self,
        input_name: &str,
        input_quantity: Option<i64>,
        raw: RawFields,
    ) -> MatchResult {
        let (matched, score) = match self.best_candidate(input_name) {
            Some((record, score)) => (Some(record), score),
            None => (None, 0.0),
        };
        let decision = MatchDecision::from_score(score);
        let matched = match decision {
            MatchDecision::Unmatched => None,
            MatchDecision::LowConfidence | MatchDecision::Confirmed => matched.cloned(),
        };

        MatchResult {
            input_name: input_name.to_string(),
            input_quantity,
            matched,
            score: display_score(score),
            decision,
            raw,
        }
    }
}

/// InDel 유사도 `(len_a + len_b - indel) / (len_a + len_b) * 100`
///
/// 삽입/삭제만 세는 편집 거리라 `2 * 공통 문자 / 전체 길이`와 같다.
/// 둘 중 하나라도 비어 있으면 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let len_sum = a.chars().count() + b.chars().count();
    let distance = rapidfuzz::distance::indel::distance(a.chars(), b.chars());
    100.0 * len_sum.saturating_sub(distance) as f64 / len_sum as f64
}

/// `유사도 점수` 열에 쓰는 정수 (버림)
fn display_score(score: f64) -> u8 {
    score.trunc().clamp(0.0, 100.0) as u8
}
