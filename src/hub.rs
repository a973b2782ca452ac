//! 실시간 구독자 레지스트리
//!
//! 구독자마다 unbounded 채널을 하나씩 두고, 메시지는 한 번만 JSON으로 직렬화해 나눠준다.
//! 수신 측이 이미 닫힌 구독자는 broadcast 도중 제거된다.

use pharm_inventory_common::CountingMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

pub type SubscriberId = u64;

#[derive(Default)]
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<SubscriberId, UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    // 보관 중인 데이터는 송신 핸들뿐이라 오염된 잠금도 그대로 쓴다
    fn subscribers(&self) -> MutexGuard<'_, HashMap<SubscriberId, UnboundedSender<String>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 구독자 등록. 받은 수신기로 푸시 메시지가 들어온다
    pub fn connect(&self) -> (SubscriberId, UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers().insert(id, tx);
        tracing::info!(subscriber = id, "구독자 연결");
        (id, rx)
    }

    /// 없는 id면 아무 일도 하지 않는다
    pub fn disconnect(&self, id: SubscriberId) {
        if self.subscribers().remove(&id).is_some() {
            tracing::info!(subscriber = id, "구독자 연결 해제");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }

    /// 전체 구독자에게 전달하고 성공한 수를 돌려준다
    pub fn broadcast(&self, message: &CountingMessage) -> usize {
        let payload = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "브로드캐스트 메시지 직렬화 실패");
                return 0;
            }
        };
        self.broadcast_text(&payload)
    }

    pub fn broadcast_text(&self, payload: &str) -> usize {
        let mut subscribers = self.subscribers();
        let mut stale = Vec::new();
        for (id, tx) in subscribers.iter() {
            if tx.send(payload.to_string()).is_err() {
                stale.push(*id);
            }
        }
        for id in &stale {
            subscribers.remove(id);
            tracing::warn!(subscriber = id, "전달 실패한 구독자 제거");
        }
        let delivered = subscribers.len();
        tracing::debug!(delivered, pruned = stale.len(), "브로드캐스트");
        delivered
    }
}

/// 감시 스레드가 넣은 메시지를 런타임 쪽에서 받아 순서대로 브로드캐스트
pub fn spawn_dispatcher(
    hub: Arc<BroadcastHub>,
    mut rx: UnboundedReceiver<CountingMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            hub.broadcast(&message);
        }
        tracing::debug!("브로드캐스트 디스패처 종료");
    })
}
