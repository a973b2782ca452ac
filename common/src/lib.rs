//! Pharm Inventory Common Library
//!
//! 업로드 경로와 카운팅 수집 경로가 함께 쓰는 순수 로직
//!
//! - [`normalizer`]: 약품명 → 비교용 키
//! - [`matcher`]: 카탈로그 유사도 매칭
//! - [`tabular`]: 엑셀 발주서 행 추출
//! - [`classifier`] / [`parser`]: PDF 발주서 행 복원

pub mod types;
pub mod error;
pub mod normalizer;
pub mod matcher;
pub mod tabular;
pub mod classifier;
pub mod parser;
pub mod export;

pub use types::{
    CanonicalDrugRecord, CountingLogEntry, CountingMessage, DedupKey, DropFilePayload,
    MatchDecision, MatchRecord, MatchResult, NewCountingLogEntry, RawFields,
};
pub use error::{Error, Result};
pub use normalizer::normalize;
pub use matcher::FuzzyMatcher;
pub use tabular::{extract_rows, match_rows, Cell, TabularRow};
pub use parser::{parse_pdf_text, PdfParseOutcome, PdfParseResponse};
