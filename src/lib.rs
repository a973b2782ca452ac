//! 약품 재고 관리 서버의 핵심 경로
//!
//! - 발주서 업로드 매칭: [`matcher`] (엑셀/PDF → 카탈로그 매칭)
//! - 카운팅 결과 수집: [`watcher`] → [`store`] → [`hub`]

pub mod catalog_import;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod hub;
pub mod logging;
pub mod matcher;
pub mod reader;
pub mod scanner;
pub mod server;
pub mod store;
pub mod watcher;
