use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pharm-inventory")]
#[command(about = "약품 발주서 매핑 / 카운팅 결과 실시간 수집 서버", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력 (debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTP 서버 + 폴더 감시 실행
    Serve {
        /// 바인드 주소 (기본: 설정값)
        #[arg(short, long)]
        bind: Option<String>,

        /// 감시 폴더 (기본: 설정값)
        #[arg(short, long)]
        watch_dir: Option<PathBuf>,
    },

    /// 폴더 감시만 실행 (브로드캐스트는 로그로 출력)
    Watch {
        /// 감시 폴더 (기본: 설정값)
        #[arg(short, long)]
        watch_dir: Option<PathBuf>,
    },

    /// 발주서(엑셀/PDF)를 카탈로그와 매칭
    Match {
        /// 입력 파일
        #[arg(required = true)]
        input: PathBuf,

        /// 출력 엑셀 파일/폴더 (기본: 입력 파일 옆 `<이름>_mapped.xlsx`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 엑셀 대신 JSON을 표준 출력으로
        #[arg(long)]
        json: bool,
    },

    /// 카탈로그 엑셀을 데이터베이스로 가져오기
    ImportCatalog {
        /// 카탈로그 엑셀 파일
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 설정 표시/편집
    Config {
        /// 감시 폴더 설정
        #[arg(long)]
        set_watch_dir: Option<PathBuf>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },
}
