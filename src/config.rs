use crate::error::{PharmError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 이미지 산출물 하위 폴더
pub const IMAGE_SUBDIR: &str = "images";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 카운팅 결과 JSON이 떨어지는 폴더
    pub watch_dir: PathBuf,
    /// SQLite 파일 경로
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// 파일 이벤트 후 읽기 전 대기 시간
    pub settle_delay_ms: u64,
    pub log_level: String,
    /// `pretty` 또는 `json`
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("counting_results"),
            database_path: PathBuf::from("pharm-inventory.db"),
            bind_addr: "127.0.0.1:8000".into(),
            settle_delay_ms: 500,
            log_level: "info".into(),
            log_format: "pretty".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        Ok(config.with_env_overrides())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PharmError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("pharm-inventory").join("config.json"))
    }

    /// 환경 변수가 파일 설정보다 우선
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("PHARM_WATCH_DIR") {
            self.watch_dir = PathBuf::from(dir);
        }
        if let Ok(db) = std::env::var("PHARM_DATABASE") {
            self.database_path = PathBuf::from(db);
        }
        if let Ok(addr) = std::env::var("PHARM_BIND_ADDR") {
            self.bind_addr = addr;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.watch_dir.as_os_str().is_empty() {
            return Err(PharmError::Config("watch_dir가 비어 있습니다".into()));
        }
        self.socket_addr()?;
        match self.log_format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(PharmError::Config(format!(
                "알 수 없는 로그 형식 '{}' (pretty/json)",
                other
            ))),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| PharmError::Config(format!("bind_addr '{}' 파싱 실패: {}", self.bind_addr, e)))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// 감시 폴더와 `images/` 하위 폴더를 만든다
    pub fn prepare_watch_dir(&self) -> Result<&Path> {
        std::fs::create_dir_all(self.watch_dir.join(IMAGE_SUBDIR))?;
        Ok(&self.watch_dir)
    }

    pub fn set_watch_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.watch_dir = dir;
        self.validate()?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settle_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let config = Config {
            bind_addr: "not-an-addr".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PharmError::Config(_))));
    }

    #[test]
    fn test_invalid_log_format() {
        let config = Config {
            log_format: "xml".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_watch_dir() {
        let config = Config {
            watch_dir: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"watch_dir": "/srv/counting"}"#).unwrap();
        assert_eq!(config.watch_dir, PathBuf::from("/srv/counting"));
        assert_eq!(config.settle_delay_ms, 500);
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn test_prepare_watch_dir_creates_images() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            watch_dir: dir.path().join("drop"),
            ..Default::default()
        };
        let prepared = config.prepare_watch_dir().unwrap();
        assert!(prepared.is_dir());
        assert!(prepared.join(IMAGE_SUBDIR).is_dir());
    }
}
