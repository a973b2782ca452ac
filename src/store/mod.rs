//! 저장소 인터페이스
//!
//! 카탈로그 조회와 카운팅 로그(추가 전용)만 다룬다.
//! 중복 확인과 삽입은 별개 호출이라 동시에 같은 내용이 들어오면 둘 다 통과할 수 있다.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use pharm_inventory_common::{CanonicalDrugRecord, CountingLogEntry, DedupKey, NewCountingLogEntry};

/// 약품 카탈로그 (읽기 전용)
pub trait Catalog: Send + Sync {
    fn list_all(&self) -> Result<Vec<CanonicalDrugRecord>>;
}

/// 카운팅 로그 저장소
pub trait CountingLogStore: Send + Sync {
    fn find(&self, key: &DedupKey) -> Result<Option<CountingLogEntry>>;

    /// 새 엔트리를 저장하고 id를 돌려준다
    fn insert(&self, entry: &NewCountingLogEntry) -> Result<i64>;
}
