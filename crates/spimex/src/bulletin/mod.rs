//! 불리틴 스프레드시트에서 거래 표를 위치 기반으로 읽어 낸다.
//!
//! 시트 레이아웃 (0-based 시트 행 기준):
//! - 0행은 미리보기 영역의 머리글로 소비된다.
//! - 미리보기 = B열, 1행부터 30개 행. 미리보기 인덱스 2가 거래일 문구.
//! - 미리보기 인덱스 k에 "Единица измерения: Метрическая тонна" 마커가 있으면
//!   시트 앞쪽 k + 2개 행을 건너뛴다. 그 다음 행이 표 머리글이다.
//! - 데이터는 B:F 열과 O열에 있다.
//!
//! 레이아웃 해석은 [`extract_from_grid`]에만 있고 파일 디코딩은 [`xls`]가 맡는다.

pub mod xls;

use interface::{Bulletin, BulletinRow, ScrapeError};

pub use xls::XlsExtractor;

pub const METRIC_TON_MARKER: &str = "Единица измерения: Метрическая тонна";
pub const TOTAL_ROW_PREFIX: &str = "Итого";
pub const NO_DEALS: &str = "-";

pub const PREVIEW_ROWS: usize = 30;
const DATE_PREVIEW_ROW: usize = 2;

// 열 위치 (A = 0)
const COL_CODE: usize = 1; // B
const COL_NAME: usize = 2; // C
const COL_BASIS: usize = 3; // D
const COL_VOLUME: usize = 4; // E
const COL_TOTAL: usize = 5; // F
const COL_COUNT: usize = 14; // O

/// 원시 바이트 -> 불리틴. 다른 파서로 교체할 수 있도록 트레이트로 둔다.
pub trait RowExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Bulletin, ScrapeError>;
}

/// 문자열로 변환된 시트 셀 (시트 절대 좌표)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetGrid {
    rows: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// 범위 밖은 빈 셀
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// 마커 인덱스 k에 대해 건너뛸 시트 행 수
pub fn header_skip(marker_index: usize) -> usize {
    marker_index + 2
}

/// 미리보기 영역 (B열, 시트 0행 제외 최대 30행)
fn preview(grid: &SheetGrid) -> Vec<&str> {
    (1..=PREVIEW_ROWS)
        .take_while(|&row| row < grid.height())
        .map(|row| grid.cell(row, COL_CODE))
        .collect()
}

/// 미리보기에서 마커 행의 인덱스
pub fn find_marker(grid: &SheetGrid) -> Option<usize> {
    preview(grid)
        .iter()
        .position(|text| text.contains(METRIC_TON_MARKER))
}

/// 미리보기 인덱스 2 문구의 마지막 토큰 (예: "... за 15.03.2023" -> "15.03.2023")
pub fn trade_date(grid: &SheetGrid) -> String {
    preview(grid)
        .get(DATE_PREVIEW_ROW)
        .and_then(|text| text.split_whitespace().last())
        .unwrap_or_default()
        .to_string()
}

/// 거래 없음 표시 행과 합계 행은 버린다
pub fn is_excluded(row: &BulletinRow) -> bool {
    row.count_raw == NO_DEALS || row.instrument_code.starts_with(TOTAL_ROW_PREFIX)
}

fn read_row(grid: &SheetGrid, row: usize) -> BulletinRow {
    BulletinRow {
        instrument_code: grid.cell(row, COL_CODE).to_string(),
        instrument_name: grid.cell(row, COL_NAME).to_string(),
        delivery_basis_name: grid.cell(row, COL_BASIS).to_string(),
        volume_raw: grid.cell(row, COL_VOLUME).to_string(),
        total_raw: grid.cell(row, COL_TOTAL).to_string(),
        count_raw: grid.cell(row, COL_COUNT).to_string(),
    }
}

fn is_blank(row: &BulletinRow) -> bool {
    [
        &row.instrument_code,
        &row.instrument_name,
        &row.delivery_basis_name,
        &row.volume_raw,
        &row.total_raw,
        &row.count_raw,
    ]
    .iter()
    .all(|cell| cell.trim().is_empty())
}

/// 시트 격자에서 거래일과 데이터 행을 뽑는다. 마커가 없으면 빈 불리틴.
pub fn extract_from_grid(grid: &SheetGrid) -> Bulletin {
    let Some(marker_index) = find_marker(grid) else {
        return Bulletin::empty();
    };

    // 건너뛴 뒤 첫 행은 표 머리글
    let first_data_row = header_skip(marker_index) + 1;

    let rows = (first_data_row..grid.height())
        .map(|row| read_row(grid, row))
        .filter(|row| !is_blank(row))
        .filter(|row| !is_excluded(row))
        .skip(1) // 머리글 두 번째 줄
        .collect();

    Bulletin {
        date: trade_date(grid),
        rows,
    }
}

/// URL 경로에 .xls 파일 이름이 있는지
pub fn is_xls_link(url: &str) -> bool {
    let path = url.split('?').next().unwrap_or_default();
    path.split('/')
        .skip(1)
        .any(|segment| segment.find(".xls").is_some_and(|i| i > 0))
}
