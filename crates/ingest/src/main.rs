use color_eyre::eyre;
use structopt::StructOpt;
use tracing::{error, info};

use ingest::record::PersistOutcome;
use ingest::IngestConfig;

// lib.rs에서 자동으로 dotenv가 로드됨

#[derive(Debug, StructOpt)]
#[structopt(name = "ingest", about = "SPIMEX 석유제품 거래 결과 수집기")]
enum Command {
    /// 불리틴을 수집해 저장
    Run,
    /// 테이블만 생성하고 종료
    InitSchema,
}

// 모든 요청은 한 스레드 위에서 번갈아 진행된다
#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging
    let _guards = ingest::logger::init_tracing();

    let cmd = Command::from_args();
    let config = IngestConfig::from_env();

    info!(
        "설정: 페이지 1..={}, 동시 요청 상한 {:?}, 타임아웃 {:?}, 불량 행 처리 {}",
        config.last_page, config.max_concurrency, config.request_timeout, config.bad_row_policy
    );

    let scrape = matches!(cmd, Command::Run);
    let report = ingest::run(&config, scrape)
        .await
        .map_err(|e| eyre::eyre!("수집 실패: {}", e))?;

    match report.persisted {
        Some(PersistOutcome::Committed(inserted)) => {
            info!(
                "완료: 링크 {}개, 불리틴 {}개, 저장 {}건",
                report.links, report.bulletins, inserted
            );
        }
        Some(PersistOutcome::RolledBack(reason)) => {
            error!("저장 실패, 전체 롤백됨: {}", reason);
        }
        None => info!("스키마 초기화 완료"),
    }

    Ok(())
}
