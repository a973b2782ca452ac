//! 로깅 초기화
//!
//! `Config`의 `log_level`, `log_format`으로 `tracing-subscriber`를 설정한다.
//! `RUST_LOG`가 있으면 그쪽이 우선.

use crate::config::Config;
use crate::error::{PharmError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// 전역 subscriber 초기화 (프로세스당 한 번)
///
/// `verbose`면 설정 레벨 대신 `debug`를 쓴다.
pub fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        other => {
            return Err(PharmError::Config(format!(
                "알 수 없는 로그 형식 '{}' (pretty/json)",
                other
            )))
        }
    }
    .map_err(|e| PharmError::Config(format!("tracing 초기화 실패: {}", e)))
}
