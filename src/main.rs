use anyhow::Context;
use clap::Parser;
use pharm_inventory::{catalog_import, cli, config, export, hub, logging, matcher, server, watcher};
use pharm_inventory::store::{CountingLogStore, SqliteStore};
use cli::{Cli, Commands};
use config::Config;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    logging::init_tracing(&config, cli.verbose)?;

    match cli.command {
        Commands::Serve { bind, watch_dir } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(dir) = watch_dir {
                config.watch_dir = dir;
            }
            config.validate()?;
            run_serve(config).await?;
        }

        Commands::Watch { watch_dir } => {
            if let Some(dir) = watch_dir {
                config.watch_dir = dir;
            }
            config.validate()?;
            run_watch(config).await?;
        }

        Commands::Match { input, output, json } => {
            let store = SqliteStore::open(&config.database_path)?;
            let report = matcher::match_file(&input, &store)
                .with_context(|| format!("매칭 실패: {}", input.display()))?;

            for error in &report.errors {
                eprintln!("⚠ {}", error);
            }

            let records = report.records();
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                let output_path = export::output_path_for(&input, output.as_deref());
                export::write_workbook(&records, &output_path)?;
                println!(
                    "✔ {}행 매칭 (확정 {}행), 경고 {}건",
                    records.len(),
                    report.confirmed_count(),
                    report.errors.len()
                );
                println!("✔ 엑셀 출력: {}", output_path.display());
            }
        }

        Commands::ImportCatalog { input } => {
            let store = SqliteStore::open(&config.database_path)?;
            let summary = catalog_import::import_catalog(&input, &store)?;
            println!(
                "✔ 추가 {}건, 기존 {}건 건너뜀, 무효 {}건",
                summary.inserted, summary.skipped, summary.invalid
            );
        }

        Commands::Config { set_watch_dir, show } => {
            if let Some(dir) = set_watch_dir {
                config.set_watch_dir(dir)?;
                println!("✔ 감시 폴더를 저장했습니다");
            }

            if show {
                println!("설정 파일: {}", Config::config_path()?.display());
                println!("  감시 폴더: {}", config.watch_dir.display());
                println!("  데이터베이스: {}", config.database_path.display());
                println!("  바인드 주소: {}", config.bind_addr);
                println!("  대기 시간: {}ms", config.settle_delay_ms);
                println!("  로그: {} ({})", config.log_level, config.log_format);
            }
        }
    }

    Ok(())
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    config.prepare_watch_dir()?;
    let store = Arc::new(SqliteStore::open(&config.database_path)?);
    let hub = Arc::new(hub::BroadcastHub::new());

    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = hub::spawn_dispatcher(hub.clone(), rx);

    let shutdown = Arc::new(AtomicBool::new(false));
    let log_store: Arc<dyn CountingLogStore> = store.clone();
    let watcher_handle = watcher::IngestionWatcher::new(
        config.watch_dir.clone(),
        log_store,
        tx,
        config.settle_delay(),
    )
    .spawn(shutdown.clone())?;

    let listener = tokio::net::TcpListener::bind(config.socket_addr()?)
        .await
        .with_context(|| format!("바인드 실패: {}", config.bind_addr))?;
    let router = server::build_router(server::AppState {
        catalog: store.clone(),
        hub,
    });
    server::serve(listener, router, shutdown_signal()).await?;

    shutdown.store(true, Ordering::Relaxed);
    join_watcher(watcher_handle).await?;
    dispatcher.await?;
    Ok(())
}

async fn run_watch(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn CountingLogStore> = Arc::new(SqliteStore::open(&config.database_path)?);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let logger = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            tracing::info!(?message, "새 카운팅 결과");
        }
    });

    let shutdown = Arc::new(AtomicBool::new(false));
    let watcher_handle =
        watcher::IngestionWatcher::new(config.watch_dir.clone(), store, tx, config.settle_delay())
            .spawn(shutdown.clone())?;

    shutdown_signal().await;
    shutdown.store(true, Ordering::Relaxed);
    join_watcher(watcher_handle).await?;
    logger.await?;
    Ok(())
}

async fn join_watcher(
    handle: std::thread::JoinHandle<pharm_inventory::error::Result<()>>,
) -> anyhow::Result<()> {
    match tokio::task::spawn_blocking(move || handle.join()).await? {
        Ok(result) => Ok(result?),
        Err(_) => anyhow::bail!("감시 스레드가 비정상 종료했습니다"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "종료 신호 대기 실패");
    }
    tracing::info!("종료 신호 수신");
}
