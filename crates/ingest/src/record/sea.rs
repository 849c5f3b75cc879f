use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set, TransactionTrait,
};
use tracing::{info, warn};

use interface::TradingRecord;

use super::entities::trading_result;
use super::{RecordError, StoredTradingRecord, TradingRecordRepository};

/// 한 INSERT 문에 넣는 기본 행 수 (컬럼 10개 기준 파라미터 5000개)
pub const DEFAULT_INSERT_CHUNK: usize = 500;

/// SeaORM 기반 거래 결과 저장소 (SQLite, PostgreSQL)
pub struct SeaTradingRecordRepository {
    db: DatabaseConnection,
    chunk_size: usize,
}

impl SeaTradingRecordRepository {
    /// 연결 후 스키마가 없으면 만든다
    pub async fn connect(db_url: &str) -> Result<Self, RecordError> {
        info!("Connecting to database: {}", redact_password(db_url));

        let db = Database::connect(db_url).await?;
        Self::from_connection(db).await
    }

    /// 이미 열린 연결을 그대로 사용
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, RecordError> {
        ensure_schema(&db).await?;

        Ok(Self {
            db,
            chunk_size: DEFAULT_INSERT_CHUNK,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn insert_chunks(
        &self,
        txn: &DatabaseTransaction,
        records: &[TradingRecord],
    ) -> Result<u64, RecordError> {
        let mut inserted = 0;

        for chunk in records.chunks(self.chunk_size) {
            let models: Vec<trading_result::ActiveModel> =
                chunk.iter().map(active_model).collect();

            inserted += trading_result::Entity::insert_many(models)
                .exec_without_returning(txn)
                .await?;
        }

        Ok(inserted)
    }
}

/// 테이블 및 인덱스 생성 (IF NOT EXISTS)
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), RecordError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_table_stmt = schema.create_table_from_entity(trading_result::Entity);
    create_table_stmt.if_not_exists();

    db.execute(backend.build(&create_table_stmt)).await?;

    use sea_orm::sea_query::Index;

    let mut date_idx = Index::create()
        .name("idx_spimex_trading_results_date")
        .table(trading_result::Entity)
        .col(trading_result::Column::Date)
        .to_owned();
    date_idx.if_not_exists();

    let mut oil_id_idx = Index::create()
        .name("idx_spimex_trading_results_oil_id")
        .table(trading_result::Entity)
        .col(trading_result::Column::OilId)
        .to_owned();
    oil_id_idx.if_not_exists();

    if let Err(e) = db.execute(backend.build(&date_idx)).await {
        tracing::debug!("Index idx_spimex_trading_results_date creation skipped: {}", e);
    }
    if let Err(e) = db.execute(backend.build(&oil_id_idx)).await {
        tracing::debug!("Index idx_spimex_trading_results_oil_id creation skipped: {}", e);
    }

    info!("spimex_trading_results table initialized");

    Ok(())
}

fn active_model(record: &TradingRecord) -> trading_result::ActiveModel {
    trading_result::ActiveModel {
        exchange_product_id: Set(record.exchange_product_id.clone()),
        exchange_product_name: Set(record.exchange_product_name.clone()),
        oil_id: Set(record.oil_id.clone()),
        delivery_basis_id: Set(record.delivery_basis_id.clone()),
        delivery_basis_name: Set(record.delivery_basis_name.clone()),
        delivery_type_id: Set(record.delivery_type_id.clone()),
        volume: Set(record.volume),
        total: Set(record.total),
        count: Set(record.count),
        date: Set(record.date),
        ..Default::default()
    }
}

/// 로그에 비밀번호가 남지 않도록 "user:pass@" 부분을 가린다
fn redact_password(db_url: &str) -> String {
    let Some((scheme, rest)) = db_url.split_once("://") else {
        return db_url.to_string();
    };
    match rest.split_once('@') {
        Some((credentials, host)) => {
            let user = credentials.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => db_url.to_string(),
    }
}

#[async_trait]
impl TradingRecordRepository for SeaTradingRecordRepository {
    async fn save_batch(&self, records: &[TradingRecord]) -> Result<u64, RecordError> {
        if records.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;

        match self.insert_chunks(&txn, records).await {
            Ok(inserted) => {
                txn.commit().await?;
                Ok(inserted)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    async fn count(&self) -> Result<u64, RecordError> {
        Ok(trading_result::Entity::find().count(&self.db).await?)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<StoredTradingRecord>, RecordError> {
        let models = trading_result::Entity::find()
            .filter(trading_result::Column::Date.eq(date))
            .order_by_asc(trading_result::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_oil_id(
        &self,
        oil_id: &str,
        limit: Option<u64>,
    ) -> Result<Vec<StoredTradingRecord>, RecordError> {
        let mut query = trading_result::Entity::find()
            .filter(trading_result::Column::OilId.eq(oil_id))
            .order_by_desc(trading_result::Column::Date)
            .order_by_asc(trading_result::Column::Id);

        if let Some(limit_val) = limit {
            query = query.limit(limit_val);
        }

        let models = query.all(&self.db).await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_all(&self, limit: Option<u64>) -> Result<Vec<StoredTradingRecord>, RecordError> {
        let mut query = trading_result::Entity::find()
            .order_by_desc(trading_result::Column::Date)
            .order_by_asc(trading_result::Column::Id);

        if let Some(limit_val) = limit {
            query = query.limit(limit_val);
        }

        let models = query.all(&self.db).await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
