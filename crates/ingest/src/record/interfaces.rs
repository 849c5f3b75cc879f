use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use interface::TradingRecord;

/// 거래 결과 저장소 인터페이스.
/// 추가와 조회만 있고 수정/삭제 경로는 없다.
#[async_trait]
pub trait TradingRecordRepository: Send + Sync {
    /// 레코드 전체를 하나의 트랜잭션으로 저장. 실패하면 아무것도 남지 않는다.
    async fn save_batch(&self, records: &[TradingRecord]) -> Result<u64, RecordError>;

    /// 저장된 레코드 수
    async fn count(&self) -> Result<u64, RecordError>;

    /// 거래일로 조회
    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<StoredTradingRecord>, RecordError>;

    /// 유종 코드로 조회 (최신 거래일 순)
    async fn find_by_oil_id(
        &self,
        oil_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<StoredTradingRecord>, RecordError>;

    /// 모든 레코드 조회 (최신 거래일 순)
    async fn find_all(&self, limit: Option<u64>) -> Result<Vec<StoredTradingRecord>, RecordError>;
}

/// 저장소에 저장된 거래 결과 (ID, 타임스탬프 포함)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTradingRecord {
    /// 데이터베이스 ID
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(flatten)]
    pub record: TradingRecord,
}

/// SeaORM trading_result::Model을 StoredTradingRecord로 변환
impl From<super::entities::trading_result::Model> for StoredTradingRecord {
    fn from(model: super::entities::trading_result::Model) -> Self {
        let record = TradingRecord {
            exchange_product_id: model.exchange_product_id,
            exchange_product_name: model.exchange_product_name,
            oil_id: model.oil_id,
            delivery_basis_id: model.delivery_basis_id,
            delivery_basis_name: model.delivery_basis_name,
            delivery_type_id: model.delivery_type_id,
            volume: model.volume,
            total: model.total,
            count: model.count,
            date: model.date,
        };

        StoredTradingRecord {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            record,
        }
    }
}

/// 기록 변환/저장 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid trade date: {0:?}")]
    InvalidDate(String),

    #[error("Empty exchange product id")]
    EmptyProductCode,
}
