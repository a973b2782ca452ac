//! 약품명 정규화
//!
//! 비교용 키만 만든다. 저장된 이름은 바꾸지 않는다.

/// 제거 대상 토큰 (제형, 용량 단위)
pub const NOISE_TOKENS: &[&str] = &["정", "mg", "밀리그램"];

/// 약품명을 비교용 키로 변환
///
/// - 소문자화
/// - 모든 공백 제거
/// - `정`, `mg`, `밀리그램` 제거 (제거 후 새로 생긴 토큰도 제거)
///
/// 빈 문자열은 빈 키가 된다.
pub fn normalize(name: &str) -> String {
    let mut key: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    loop {
        let stripped = NOISE_TOKENS
            .iter()
            .fold(key.clone(), |acc, token| acc.replace(token, ""));
        if stripped == key {
            return key;
        }
        key = stripped;
    }
}

/// `Option` 입력용 (없으면 빈 키)
pub fn normalize_opt(name: Option<&str>) -> String {
    name.map(normalize).unwrap_or_default()
}
