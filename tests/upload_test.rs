//! 발주서 업로드 통합 테스트
//!
//! 엑셀 픽스처는 rust_xlsxwriter로 그때그때 만든다.

use pharm_inventory::hub::BroadcastHub;
use pharm_inventory::matcher;
use pharm_inventory::server::{self, AppState};
use pharm_inventory::store::{Catalog, MemoryStore, SqliteStore};
use futures_util::StreamExt;
use pharm_inventory_common::{CanonicalDrugRecord, CountingMessage};
use rust_xlsxwriter::Workbook;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn catalog() -> Vec<CanonicalDrugRecord> {
    vec![
        CanonicalDrugRecord {
            id: 1,
            drug_name: "게보린정".to_string(),
            standard_code: "A1".to_string(),
            product_code: Some("P-100".to_string()),
            manufacturer: Some("삼진제약".to_string()),
            image_url: None,
        },
        CanonicalDrugRecord {
            id: 2,
            drug_name: "타이레놀정500밀리그램".to_string(),
            standard_code: "A2".to_string(),
            ..Default::default()
        },
    ]
}

fn order_sheet(rows: &[(&str, f64)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, " 상품명 ").unwrap();
    sheet.write_string(0, 1, "수량").unwrap();
    for (i, (name, qty)) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, *name).unwrap();
        sheet.write_number(row, 1, *qty).unwrap();
    }
    workbook.save_to_buffer().unwrap()
}

/// 게보린 → 게보린정(A1) 확정
#[test]
fn test_spreadsheet_end_to_end() {
    let store = MemoryStore::with_catalog(catalog());
    let bytes = order_sheet(&[("게보린", 10.0), ("타이레놀 500mg", 3.0), ("전혀다른이름의약품", 1.0)]);

    let results = matcher::match_spreadsheet(bytes, &store).unwrap();
    assert_eq!(results.len(), 3);

    let first = results[0].to_record();
    assert_eq!(first.mapped, "O");
    assert_eq!(first.standard_code.as_deref(), Some("A1"));
    assert_eq!(first.product_code.as_deref(), Some("P-100"));
    assert_eq!(first.input_quantity, Some(10));

    let second = results[1].to_record();
    assert_eq!(second.mapped_name.as_deref(), Some("타이레놀정500밀리그램"));
    assert_eq!(second.mapped, "O");

    let third = results[2].to_record();
    assert_eq!(third.mapped, "X");
    assert_eq!(third.mapped_name, None);
}

/// 파일 경로로 매칭 (CLI 경로)
#[test]
fn test_match_file_from_sqlite_catalog() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("pharm.db")).unwrap();
    for record in catalog() {
        store.insert_drug(&record).unwrap();
    }
    let input = dir.path().join("발주서.xlsx");
    std::fs::write(&input, order_sheet(&[("게보린", 2.0)])).unwrap();

    let report = matcher::match_file(&input, &store).unwrap();
    assert_eq!(report.confirmed_count(), 1);
    assert!(report.errors.is_empty());
    assert_eq!(report.records()[0].standard_code.as_deref(), Some("A1"));
}

async fn spawn_server(catalog: Arc<dyn Catalog>) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    spawn_server_with_hub(catalog, Arc::new(BroadcastHub::new())).await
}

async fn spawn_server_with_hub(
    catalog: Arc<dyn Catalog>,
    hub: Arc<BroadcastHub>,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = server::build_router(AppState { catalog, hub });
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(server::serve(listener, router, async move {
        let _ = stop_rx.await;
    }));
    (addr, stop_tx)
}

fn file_form(name: &str, bytes: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(bytes).file_name(name.to_string());
    reqwest::multipart::Form::new().part("file", part)
}

#[tokio::test]
async fn test_http_match_json_and_upload() {
    let (addr, stop) = spawn_server(Arc::new(MemoryStore::with_catalog(catalog()))).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/match-json", addr))
        .multipart(file_form("order.xlsx", order_sheet(&[("게보린", 10.0)])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let rows: serde_json::Value = response.json().await.unwrap();
    assert_eq!(rows[0]["입력 약품명"], "게보린");
    assert_eq!(rows[0]["표준코드"], "A1");
    assert_eq!(rows[0]["매핑 여부"], "O");

    let response = client
        .post(format!("http://{}/upload", addr))
        .multipart(file_form("order.xlsx", order_sheet(&[("게보린", 10.0)])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("mapped_result.xlsx"));
    let body = response.bytes().await.unwrap();
    assert!(body.starts_with(b"PK"));

    let _ = stop.send(());
}

#[tokio::test]
async fn test_http_rejects_unsupported_upload() {
    let (addr, stop) = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/match-json", addr))
        .multipart(file_form("memo.txt", b"hello".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("memo.txt"));

    let response = client
        .post(format!("http://{}/match-pdf", addr))
        .multipart(file_form("order.xlsx", order_sheet(&[])))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let _ = stop.send(());
}

#[tokio::test]
async fn test_http_health_and_save_row() {
    let (addr, stop) = spawn_server(Arc::new(MemoryStore::new())).await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["subscribers"], 0);

    let ack: serde_json::Value = client
        .post(format!("http://{}/save-matched-row", addr))
        .json(&serde_json::json!({ "입력 약품명": "게보린", "매핑 여부": "O" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack["message"], "확인 완료");

    let _ = stop.send(());
}

/// 허브에 올린 카운팅 결과가 두 WebSocket 경로 구독자에게 JSON 텍스트로 전달된다
#[tokio::test]
async fn test_websocket_receives_counting_message() {
    let hub = Arc::new(BroadcastHub::new());
    let (addr, stop) = spawn_server_with_hub(Arc::new(MemoryStore::new()), hub.clone()).await;

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    let (mut ws_alias, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws/drug-count", addr))
        .await
        .unwrap();

    // 업그레이드 후 허브 등록까지 대기
    for _ in 0..100 {
        if hub.subscriber_count() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(hub.subscriber_count(), 2);

    let sent = CountingMessage {
        id: 7,
        timestamp: "2025-03-01T10:00:00".to_string(),
        drug_name: "게보린정".to_string(),
        drug_standard_code: "8806789012345".to_string(),
        count_quantity: 30,
    };
    assert_eq!(hub.broadcast(&sent), 2);

    for socket in [&mut ws, &mut ws_alias] {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("WebSocket 메시지 대기 시간 초과")
            .expect("WebSocket 스트림 종료")
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["timestamp"], "2025-03-01T10:00:00");
        assert_eq!(body["drug_name"], "게보린정");
        assert_eq!(body["drug_standard_code"], "8806789012345");
        assert_eq!(body["count_quantity"], 30);
    }

    let _ = stop.send(());
}
