//! SQLite 저장소
//!
//! - `drug`: 약품 카탈로그 (`standard_code` 유일)
//! - `counting_log`: 카운팅 결과 로그 (추가만, 수정/삭제 없음)

use super::{Catalog, CountingLogStore};
use crate::error::{PharmError, Result};
use pharm_inventory_common::{CanonicalDrugRecord, CountingLogEntry, DedupKey, NewCountingLogEntry};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// 파일을 열고 (없으면 생성) 스키마를 준비
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        tracing::info!(path = %path.display(), "SQLite 저장소 열기");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| PharmError::LockPoisoned)
    }

    /// 카탈로그에 추가 (같은 표준코드가 있으면 건너뛰고 false)
    pub fn insert_drug(&self, record: &CanonicalDrugRecord) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO drug (drug_name, standard_code, product_code, manufacturer, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.drug_name,
                record.standard_code,
                record.product_code,
                record.manufacturer,
                record.image_url,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// 저장된 카운팅 로그 전체 (id 오름차순)
    pub fn counting_logs(&self) -> Result<Vec<CountingLogEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, drug_name, drug_standard_code, drug_refer_code, count_quantity, source_filename
             FROM counting_log ORDER BY id",
        )?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS drug (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            drug_name     TEXT NOT NULL,
            standard_code TEXT NOT NULL UNIQUE,
            product_code  TEXT,
            manufacturer  TEXT,
            image_url     TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_drug_name ON drug (drug_name);

        CREATE TABLE IF NOT EXISTS counting_log (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp          TEXT NOT NULL,
            drug_name          TEXT NOT NULL,
            drug_standard_code TEXT NOT NULL,
            drug_refer_code    TEXT NOT NULL,
            count_quantity     INTEGER NOT NULL,
            source_filename    TEXT NOT NULL,
            received_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_counting_log_dedup
            ON counting_log (timestamp, drug_standard_code, drug_name, count_quantity);",
    )
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CountingLogEntry> {
    Ok(CountingLogEntry {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        drug_name: row.get(2)?,
        drug_standard_code: row.get(3)?,
        drug_refer_code: row.get(4)?,
        count_quantity: row.get(5)?,
        source_filename: row.get(6)?,
    })
}

impl Catalog for SqliteStore {
    fn list_all(&self) -> Result<Vec<CanonicalDrugRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, drug_name, standard_code, product_code, manufacturer, image_url
             FROM drug ORDER BY id",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(CanonicalDrugRecord {
                    id: row.get(0)?,
                    drug_name: row.get(1)?,
                    standard_code: row.get(2)?,
                    product_code: row.get(3)?,
                    manufacturer: row.get(4)?,
                    image_url: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

impl CountingLogStore for SqliteStore {
    fn find(&self, key: &DedupKey) -> Result<Option<CountingLogEntry>> {
        let conn = self.conn()?;
        let entry = conn
            .query_row(
                "SELECT id, timestamp, drug_name, drug_standard_code, drug_refer_code, count_quantity, source_filename
                 FROM counting_log
                 WHERE timestamp = ?1 AND drug_standard_code = ?2 AND drug_name = ?3 AND count_quantity = ?4
                 ORDER BY id LIMIT 1",
                params![
                    key.timestamp,
                    key.drug_standard_code,
                    key.drug_name,
                    key.count_quantity
                ],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn insert(&self, entry: &NewCountingLogEntry) -> Result<i64> {
        let conn = self.conn()?;
        let received_at = chrono::Local::now().to_rfc3339();
        conn.execute(
            "INSERT INTO counting_log
                (timestamp, drug_name, drug_standard_code, drug_refer_code, count_quantity, source_filename, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.timestamp,
                entry.drug_name,
                entry.drug_standard_code,
                entry.drug_refer_code,
                entry.count_quantity,
                entry.source_filename,
                received_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}
