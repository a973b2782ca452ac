//! 매칭 결과 내보내기

#[cfg(feature = "excel")]
pub mod excel_core;
