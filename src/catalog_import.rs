//! 카탈로그 엑셀 가져오기
//!
//! 표준코드가 이미 있는 약품은 건너뛴다. 약품명이나 표준코드가 빈 행은 무효로 센다.

use crate::error::{PharmError, Result};
use crate::reader;
use crate::store::SqliteStore;
use pharm_inventory_common::{CanonicalDrugRecord, Cell, Error as CommonError};
use std::path::Path;

const NAME_HEADERS: &[&str] = &["drug_name", "약품명", "제품명"];
const CODE_HEADERS: &[&str] = &["standard_code", "표준코드"];
const PRODUCT_CODE_HEADERS: &[&str] = &["product_code", "품목일련번호"];
const MANUFACTURER_HEADERS: &[&str] = &["manufacturer", "제조사", "업체명"];
const IMAGE_HEADERS: &[&str] = &["image_url", "약품 이미지"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
}

struct CatalogColumns {
    name: usize,
    code: usize,
    product_code: Option<usize>,
    manufacturer: Option<usize>,
    image_url: Option<usize>,
}

impl CatalogColumns {
    fn locate(header: &[Cell]) -> Result<Self> {
        let names: Vec<String> = header
            .iter()
            .map(|c| c.as_text().unwrap_or_default())
            .collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|h| h == alias))
        };
        let required = |aliases: &[&str]| {
            find(aliases).ok_or_else(|| PharmError::Common(CommonError::MissingColumn(aliases.join("/"))))
        };

        Ok(Self {
            name: required(NAME_HEADERS)?,
            code: required(CODE_HEADERS)?,
            product_code: find(PRODUCT_CODE_HEADERS),
            manufacturer: find(MANUFACTURER_HEADERS),
            image_url: find(IMAGE_HEADERS),
        })
    }

    fn record(&self, row: &[Cell]) -> Option<CanonicalDrugRecord> {
        let text = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(Cell::as_text);
        Some(CanonicalDrugRecord {
            id: 0,
            drug_name: text(Some(self.name))?,
            standard_code: text(Some(self.code))?,
            product_code: text(self.product_code),
            manufacturer: text(self.manufacturer),
            image_url: text(self.image_url),
        })
    }
}

/// 시트 행(첫 행은 헤더)을 카탈로그 레코드로
pub fn parse_catalog_rows(rows: Vec<Vec<Cell>>) -> Result<(Vec<CanonicalDrugRecord>, usize)> {
    let mut iter = rows.into_iter();
    let Some(header) = iter.next() else {
        return Ok((Vec::new(), 0));
    };
    let columns = CatalogColumns::locate(&header)?;

    let mut records = Vec::new();
    let mut invalid = 0;
    for row in iter {
        if row.iter().all(|c| c.as_text().is_none()) {
            continue;
        }
        match columns.record(&row) {
            Some(record) => records.push(record),
            None => invalid += 1,
        }
    }
    Ok((records, invalid))
}

pub fn import_catalog(path: &Path, store: &SqliteStore) -> Result<ImportSummary> {
    if !path.exists() {
        return Err(PharmError::FileNotFound(path.display().to_string()));
    }
    let rows = reader::read_first_sheet(std::fs::read(path)?)?;
    let (records, invalid) = parse_catalog_rows(rows)?;

    let mut summary = ImportSummary {
        invalid,
        ..Default::default()
    };
    for record in &records {
        if store.insert_drug(record)? {
            summary.inserted += 1;
        } else {
            tracing::debug!(code = %record.standard_code, "이미 있는 표준코드");
            summary.skipped += 1;
        }
    }
    tracing::info!(
        inserted = summary.inserted,
        skipped = summary.skipped,
        invalid = summary.invalid,
        "카탈로그 가져오기 완료"
    );
    Ok(summary)
}
