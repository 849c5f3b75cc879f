use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 불리틴 표에서 위치 기반으로 읽어 낸 한 행 (모든 값은 원본 문자열)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletinRow {
    pub instrument_code: String,
    pub instrument_name: String,
    pub delivery_basis_name: String,
    pub volume_raw: String, // 계약 물량 (톤)
    pub total_raw: String,  // 계약 금액 (루블)
    pub count_raw: String,  // 계약 건수, 거래 없음은 "-"
}

/// 하루치 불리틴 추출 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulletin {
    /// "dd.mm.yyyy" 형식 거래일, 마커를 못 찾으면 빈 문자열
    pub date: String,
    pub rows: Vec<BulletinRow>,
}

impl Bulletin {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 상품 코드에서 파생되는 식별자 묶음
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductCode {
    pub oil_id: String,
    pub delivery_basis_id: String,
    pub delivery_type_id: String,
}

impl ProductCode {
    /// 코드 앞 4글자 = 유종, 5~7번째 = 인도 기준지, 마지막 글자 = 인도 방식.
    /// 코드가 짧으면 가능한 만큼만 잘라낸다.
    pub fn split(code: &str) -> Self {
        let oil_id = code.chars().take(4).collect();
        let delivery_basis_id = code.chars().skip(4).take(3).collect();
        let delivery_type_id = code
            .chars()
            .last()
            .map(String::from)
            .unwrap_or_default();

        Self {
            oil_id,
            delivery_basis_id,
            delivery_type_id,
        }
    }
}

/// 거래 결과 레코드 (저장소에 들어가기 직전의 형태)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingRecord {
    pub exchange_product_id: String,
    pub exchange_product_name: String,
    pub oil_id: String,
    pub delivery_basis_id: String,
    pub delivery_basis_name: String,
    pub delivery_type_id: String,
    pub volume: f64,
    pub total: f64,
    pub count: f64,
    pub date: NaiveDate,
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("html error: {0}")]
    Html(String),
    #[error("other error: {0}")]
    Other(String),
}
