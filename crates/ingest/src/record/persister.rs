use tracing::{error, info};

use interface::TradingRecord;

use super::TradingRecordRepository;

/// 일괄 저장 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// 커밋된 행 수
    Committed(u64),
    /// 트랜잭션 전체가 롤백됨 (에러 메시지)
    RolledBack(String),
}

/// 레코드 일괄 저장.
/// 저장 실패는 로그만 남기고 호출자에게 에러로 올리지 않는다.
pub async fn persist_batch(
    repo: &dyn TradingRecordRepository,
    records: &[TradingRecord],
) -> PersistOutcome {
    match repo.save_batch(records).await {
        Ok(inserted) => {
            info!("Inserted {} records", inserted);
            PersistOutcome::Committed(inserted)
        }
        Err(e) => {
            error!(
                "Failed to insert {} records, transaction rolled back: {}",
                records.len(),
                e
            );
            PersistOutcome::RolledBack(e.to_string())
        }
    }
}
