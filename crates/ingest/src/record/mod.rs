pub mod entities;
pub mod interfaces;
pub mod persister;
pub mod sea;

pub use interfaces::{RecordError, StoredTradingRecord, TradingRecordRepository};
pub use persister::{persist_batch, PersistOutcome};
pub use sea::{ensure_schema, SeaTradingRecordRepository, DEFAULT_INSERT_CHUNK};
