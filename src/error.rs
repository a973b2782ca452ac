use thiserror::Error;

#[derive(Error, Debug)]
pub enum PharmError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("폴더를 찾을 수 없습니다: {0}")]
    FolderNotFound(String),

    #[error("엑셀 읽기 오류: {0}")]
    SpreadsheetRead(String),

    #[error("PDF 텍스트 추출 오류: {0}")]
    PdfExtraction(String),

    #[error("엑셀 생성 오류: {0}")]
    ExcelGeneration(String),

    #[error("지원하지 않는 파일 형식입니다: {0}")]
    UnsupportedUpload(String),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("저장소 잠금이 오염되었습니다")]
    LockPoisoned,

    #[error("파일 감시 오류: {0}")]
    Watcher(#[from] notify::Error),

    #[error("JSON 파싱 오류: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] pharm_inventory_common::Error),
}

pub type Result<T> = std::result::Result<T, PharmError>;
