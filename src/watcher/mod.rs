//! 카운팅 결과 폴더 감시
//!
//! 전용 OS 스레드에서 돈다. notify 이벤트는 표준 채널로 받아 순서대로 처리하고,
//! 저장된 결과는 tokio 채널로 넘겨 서버 쪽 런타임이 브로드캐스트하게 한다.

mod pipeline;

pub use pipeline::{IngestionPipeline, Outcome};

use crate::config::IMAGE_SUBDIR;
use crate::error::Result;
use crate::store::CountingLogStore;
use notify::{EventKind, RecursiveMode, Watcher};
use pharm_inventory_common::CountingMessage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// 종료 플래그 확인 주기
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct IngestionWatcher {
    dir: PathBuf,
    pipeline: IngestionPipeline,
}

impl IngestionWatcher {
    pub fn new(
        dir: PathBuf,
        store: Arc<dyn CountingLogStore>,
        notifier: UnboundedSender<CountingMessage>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            dir,
            pipeline: IngestionPipeline::new(store, notifier, settle_delay),
        }
    }

    /// 폴더 준비 → 감시 등록 → 백로그 처리 → 쌓인 이벤트부터 실시간 처리 (shutdown이 켜질 때까지)
    pub fn run(mut self, shutdown: Arc<AtomicBool>) -> Result<()> {
        std::fs::create_dir_all(self.dir.join(IMAGE_SUBDIR))?;

        // 백로그 처리 중에 떨어진 파일도 놓치지 않도록 감시를 먼저 건다.
        // 겹치는 이벤트는 처리 완료 집합과 중복 키 확인에서 걸러진다.
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&self.dir, RecursiveMode::Recursive)?;

        let backlog = self.pipeline.catch_up(&self.dir)?;
        let inserted = backlog
            .iter()
            .filter(|o| matches!(o, Outcome::Inserted(_)))
            .count();
        tracing::info!(files = backlog.len(), inserted, "백로그 처리 완료");
        tracing::info!(dir = %self.dir.display(), "폴더 감시 시작");

        while !shutdown.load(Ordering::Relaxed) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(Ok(event)) => {
                    if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        for path in &event.paths {
                            self.pipeline.handle_path(path);
                        }
                    }
                }
                Ok(Err(e)) => tracing::warn!(error = %e, "파일 감시 이벤트 오류"),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        tracing::info!("폴더 감시 종료");
        Ok(())
    }

    pub fn spawn(self, shutdown: Arc<AtomicBool>) -> std::io::Result<JoinHandle<Result<()>>> {
        std::thread::Builder::new()
            .name("ingestion-watcher".into())
            .spawn(move || {
                let result = self.run(shutdown);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "폴더 감시 중단");
                }
                result
            })
    }
}
