use crate::error::Result;
use crate::scanner::{self, DropFileKind};
use crate::store::CountingLogStore;
use pharm_inventory_common::{CountingLogEntry, CountingMessage, DropFilePayload};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// 파일 하나를 처리한 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 새로 저장되고 브로드캐스트가 예약됨
    Inserted(CountingLogEntry),
    /// 같은 키의 엔트리가 이미 있음 (기존 id)
    Duplicate(i64),
    /// 이번 실행에서 이미 처리한 파일
    AlreadyHandled,
    ImageLogged,
    Ignored,
    /// 읽기/파싱/저장 실패 (다음 이벤트에서 다시 시도된다)
    Failed(String),
}

/// 결과 파일 → 중복 확인 → 저장 → 브로드캐스트 예약
pub struct IngestionPipeline {
    store: Arc<dyn CountingLogStore>,
    notifier: UnboundedSender<CountingMessage>,
    settle_delay: Duration,
    handled: HashSet<PathBuf>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn CountingLogStore>,
        notifier: UnboundedSender<CountingMessage>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            settle_delay,
            handled: HashSet::new(),
        }
    }

    pub fn is_handled(&self, path: &Path) -> bool {
        self.handled.contains(path)
    }

    /// 기동 시 폴더에 남아 있는 결과 파일을 순서대로 처리
    pub fn catch_up(&mut self, dir: &Path) -> Result<Vec<Outcome>> {
        let files = scanner::scan_result_files(dir)?;
        tracing::info!(files = files.len(), dir = %dir.display(), "백로그 처리 시작");
        let outcomes = files
            .iter()
            .map(|path| self.ingest(path, Duration::ZERO))
            .collect();
        Ok(outcomes)
    }

    /// 파일 이벤트 하나 처리 (JSON은 쓰기가 끝나도록 잠시 기다린다)
    pub fn handle_path(&mut self, path: &Path) -> Outcome {
        self.ingest(path, self.settle_delay)
    }

    fn ingest(&mut self, path: &Path, delay: Duration) -> Outcome {
        match scanner::classify_path(path) {
            DropFileKind::Image => {
                tracing::info!(path = %path.display(), "이미지 파일 감지");
                Outcome::ImageLogged
            }
            DropFileKind::Other => Outcome::Ignored,
            DropFileKind::CountingResult => {
                if self.handled.contains(path) {
                    return Outcome::AlreadyHandled;
                }
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                match self.process_json(path) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "결과 파일 처리 실패");
                        Outcome::Failed(e.to_string())
                    }
                }
            }
        }
    }

    fn process_json(&mut self, path: &Path) -> Result<Outcome> {
        let content = std::fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let entry = DropFilePayload::from_json(&content)?.into_entry(&file_name)?;

        if let Some(existing) = self.store.find(&entry.dedup_key())? {
            tracing::debug!(file = %file_name, id = existing.id, "중복 결과 건너뜀");
            self.handled.insert(path.to_path_buf());
            return Ok(Outcome::Duplicate(existing.id));
        }

        let id = self.store.insert(&entry)?;
        self.handled.insert(path.to_path_buf());
        let stored = entry.with_id(id);
        tracing::info!(
            file = %file_name,
            id,
            drug = %stored.drug_name,
            quantity = stored.count_quantity,
            "카운팅 결과 저장"
        );

        if self.notifier.send(stored.to_message()).is_err() {
            tracing::warn!(id, "브로드캐스트 채널이 닫혀 있음");
        }
        Ok(Outcome::Inserted(stored))
    }
}
