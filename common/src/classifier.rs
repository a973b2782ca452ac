//! PDF 본문 라인 분류기
//!
//! 본문의 각 세그먼트를 규칙표 순서대로 검사해 첫 번째로 맞는 필드에 넣는다.
//!
//! | 순서 | 필드 | 조건 |
//! |------|------|------|
//! | 1 | 약품명 | 버퍼에 약품명이 아직 없음 |
//! | 2 | 표준코드 | `880`으로 시작하는 13자리 숫자 |
//! | 3 | 제조사 | `(주)`, `(유)`, `㈜` 포함 |
//! | 4 | 규격 | 숫자(+단위) 포함, 숫자만으로 된 줄은 제외 |
//! | 5 | 수량 | 숫자만 |
//!
//! 어느 규칙에도 맞지 않는 세그먼트는 버린다.

use regex::Regex;

lazy_static::lazy_static! {
    static ref CODE_RE: Regex = Regex::new(r"^880\d{10}$").unwrap();
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"\d+").unwrap();
    static ref MANUFACTURER_RE: Regex = Regex::new(r"\((주|유)\)|㈜").unwrap();
    static ref SPEC_RE: Regex = Regex::new(r"\d+(mg|밀리그램)?").unwrap();
    static ref QUANTITY_RE: Regex = Regex::new(r"^\d+$").unwrap();
}

/// 분류 대상 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    StandardCode,
    Manufacturer,
    Spec,
    Quantity,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Name => write!(f, "약품명"),
            FieldKind::StandardCode => write!(f, "표준코드"),
            FieldKind::Manufacturer => write!(f, "제조사"),
            FieldKind::Spec => write!(f, "규격"),
            FieldKind::Quantity => write!(f, "수량"),
        }
    }
}

/// 버퍼 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// 약품명을 기다리는 중 (다음 세그먼트는 무조건 약품명)
    AwaitingName,
    /// 약품명 이후 나머지 필드 수집 중
    Collecting,
}

/// PDF 파싱 중 한 행의 필드를 모으는 버퍼
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRowBuffer {
    pub name: Option<String>,
    pub code: Option<String>,
    pub manufacturer: Option<String>,
    pub spec: Option<String>,
    pub quantity: Option<String>,
}

impl ParsedRowBuffer {
    pub fn state(&self) -> BufferState {
        if self.name.is_none() {
            BufferState::AwaitingName
        } else {
            BufferState::Collecting
        }
    }

    /// 채워진 필드 수
    pub fn populated(&self) -> usize {
        [
            &self.name,
            &self.code,
            &self.manufacturer,
            &self.spec,
            &self.quantity,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated() == 0
    }

    /// 같은 필드가 다시 오면 덮어쓴다
    pub fn set(&mut self, kind: FieldKind, value: &str) {
        let value = Some(value.to_string());
        match kind {
            FieldKind::Name => self.name = value,
            FieldKind::StandardCode => self.code = value,
            FieldKind::Manufacturer => self.manufacturer = value,
            FieldKind::Spec => self.spec = value,
            FieldKind::Quantity => self.quantity = value,
        }
    }

    /// 버퍼를 비우고 이전 내용을 반환
    pub fn take(&mut self) -> ParsedRowBuffer {
        std::mem::take(self)
    }

    /// 에러 메시지용 요약
    pub fn describe(&self) -> String {
        let fields = [
            (FieldKind::Name, &self.name),
            (FieldKind::StandardCode, &self.code),
            (FieldKind::Manufacturer, &self.manufacturer),
            (FieldKind::Spec, &self.spec),
            (FieldKind::Quantity, &self.quantity),
        ];
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|(kind, value)| value.as_ref().map(|v| format!("{}={}", kind, v)))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

/// 분류 규칙 하나
pub struct ClassifierRule {
    pub kind: FieldKind,
    pub matches: fn(&ParsedRowBuffer, &str) -> bool,
}

/// 우선순위 순서의 규칙표
pub const RULES: [ClassifierRule; 5] = [
    ClassifierRule {
        kind: FieldKind::Name,
        matches: awaiting_name,
    },
    ClassifierRule {
        kind: FieldKind::StandardCode,
        matches: code_rule,
    },
    ClassifierRule {
        kind: FieldKind::Manufacturer,
        matches: manufacturer_rule,
    },
    ClassifierRule {
        kind: FieldKind::Spec,
        matches: spec_rule,
    },
    ClassifierRule {
        kind: FieldKind::Quantity,
        matches: quantity_rule,
    },
];

fn awaiting_name(buffer: &ParsedRowBuffer, _segment: &str) -> bool {
    buffer.state() == BufferState::AwaitingName
}

fn code_rule(_: &ParsedRowBuffer, segment: &str) -> bool {
    is_standard_code(segment)
}

fn manufacturer_rule(_: &ParsedRowBuffer, segment: &str) -> bool {
    is_manufacturer(segment)
}

fn spec_rule(_: &ParsedRowBuffer, segment: &str) -> bool {
    is_spec(segment)
}

fn quantity_rule(_: &ParsedRowBuffer, segment: &str) -> bool {
    is_quantity(segment)
}

/// 첫 번째로 맞는 규칙의 필드
pub fn classify(buffer: &ParsedRowBuffer, segment: &str) -> Option<FieldKind> {
    RULES
        .iter()
        .find(|rule| (rule.matches)(buffer, segment))
        .map(|rule| rule.kind)
}

pub fn is_standard_code(segment: &str) -> bool {
    CODE_RE.is_match(segment)
}

pub fn is_manufacturer(segment: &str) -> bool {
    MANUFACTURER_RE.is_match(segment)
}

pub fn is_spec(segment: &str) -> bool {
    SPEC_RE.is_match(segment) && !is_quantity(segment)
}

pub fn is_quantity(segment: &str) -> bool {
    QUANTITY_RE.is_match(segment)
}

/// 표준코드가 붙어 있는 줄을 `[앞부분, 코드, 뒷부분]`으로 나눈다
///
/// 정확히 13자리이고 `880`으로 시작하는 숫자열만 코드로 본다.
/// 빈 조각은 버리고, 코드가 없으면 줄 전체를 그대로 돌려준다.
pub fn split_mixed_line(line: &str) -> Vec<String> {
    let code = DIGIT_RUN_RE
        .find_iter(line)
        .find(|m| m.as_str().len() == 13 && m.as_str().starts_with("880"));

    match code {
        Some(m) => [
            line[..m.start()].trim(),
            m.as_str(),
            line[m.end()..].trim(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect(),
        None => vec![line.to_string()],
    }
}
