use chrono::NaiveDate;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

use interface::{Bulletin, BulletinRow, ProductCode, TradingRecord};

use crate::record::RecordError;

/// 불리틴 거래일 형식 ("15.03.2023")
pub const TRADE_DATE_FORMAT: &str = "%d.%m.%Y";

/// 숫자를 읽을 수 없는 행의 처리 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BadRowPolicy {
    /// 첫 불량 행에서 전체 실행 중단
    #[default]
    Abort,
    /// 불량 행은 경고 로그 후 건너뜀
    Skip,
}

impl Display for BadRowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadRowPolicy::Abort => write!(f, "ABORT"),
            BadRowPolicy::Skip => write!(f, "SKIP"),
        }
    }
}

impl FromStr for BadRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ABORT" => Ok(BadRowPolicy::Abort),
            "SKIP" => Ok(BadRowPolicy::Skip),
            _ => Err(format!("Invalid BadRowPolicy: {}", s)),
        }
    }
}

pub fn parse_trade_date(raw: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(raw.trim(), TRADE_DATE_FORMAT)
        .map_err(|_| RecordError::InvalidDate(raw.to_string()))
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, RecordError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RecordError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// 한 행을 거래 결과로 변환
pub fn map_row(row: &BulletinRow, date: NaiveDate) -> Result<TradingRecord, RecordError> {
    if row.instrument_code.is_empty() {
        return Err(RecordError::EmptyProductCode);
    }

    let code = ProductCode::split(&row.instrument_code);

    Ok(TradingRecord {
        exchange_product_id: row.instrument_code.clone(),
        exchange_product_name: row.instrument_name.clone(),
        oil_id: code.oil_id,
        delivery_basis_id: code.delivery_basis_id,
        delivery_basis_name: row.delivery_basis_name.clone(),
        delivery_type_id: code.delivery_type_id,
        volume: parse_number("volume", &row.volume_raw)?,
        total: parse_number("total", &row.total_raw)?,
        count: parse_number("count", &row.count_raw)?,
        date,
    })
}

/// 불리틴 하나를 레코드 목록으로.
/// 행이 없으면 거래일을 해석하지 않는다 (마커 없는 파일은 빈 결과).
pub fn map_bulletin(
    bulletin: &Bulletin,
    policy: BadRowPolicy,
) -> Result<Vec<TradingRecord>, RecordError> {
    if bulletin.is_empty() {
        return Ok(Vec::new());
    }

    let date = parse_trade_date(&bulletin.date)?;
    let mut records = Vec::with_capacity(bulletin.rows.len());

    for row in &bulletin.rows {
        match map_row(row, date) {
            Ok(record) => records.push(record),
            Err(e) if policy == BadRowPolicy::Skip => {
                warn!(
                    "Skipping row {:?} of bulletin {}: {}",
                    row.instrument_code, bulletin.date, e
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

/// 모든 불리틴을 하나의 배치로 펼친다
pub fn map_bulletins(
    bulletins: &[Bulletin],
    policy: BadRowPolicy,
) -> Result<Vec<TradingRecord>, RecordError> {
    let mut batch = Vec::new();
    for bulletin in bulletins {
        batch.extend(map_bulletin(bulletin, policy)?);
    }
    Ok(batch)
}
