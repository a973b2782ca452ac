//! 에러 타입 정의

use thiserror::Error;

/// 공통 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("필수 열이 없습니다: {0}")]
    MissingColumn(String),

    #[error("카운팅 결과 형식 오류: {0}")]
    InvalidPayload(String),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_display_missing_column() {
        let error = Error::MissingColumn("수량".to_string());
        assert_eq!(format!("{}", error), "필수 열이 없습니다: 수량");
    }

    #[test]
    fn test_error_display_invalid_payload() {
        let error = Error::InvalidPayload("count_quantity".to_string());
        let display = format!("{}", error);
        assert!(display.contains("count_quantity"));
    }
}
