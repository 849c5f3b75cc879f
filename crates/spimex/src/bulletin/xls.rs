use calamine::{open_workbook_from_rs, Data, Range, Reader, Xls};
use std::io::Cursor;
use tracing::debug;

use interface::{Bulletin, ScrapeError};

use super::{extract_from_grid, RowExtractor, SheetGrid};

/// 레거시 BIFF(.xls) 불리틴 추출기. 첫 번째 시트만 읽는다.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsExtractor;

impl RowExtractor for XlsExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<Bulletin, ScrapeError> {
        let grid = read_first_sheet(bytes)?;
        let bulletin = extract_from_grid(&grid);

        debug!(
            "Extracted {} rows for {:?} from {} sheet rows",
            bulletin.rows.len(),
            bulletin.date,
            grid.height()
        );

        Ok(bulletin)
    }
}

/// 워크북 바이트를 열어 첫 시트를 문자열 격자로 바꾼다
pub fn read_first_sheet(bytes: &[u8]) -> Result<SheetGrid, ScrapeError> {
    let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| ScrapeError::Spreadsheet(format!("failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScrapeError::Spreadsheet("workbook has no sheets".to_string()))?
        .map_err(|e| ScrapeError::Spreadsheet(format!("failed to read first sheet: {}", e)))?;

    Ok(grid_from_range(&range))
}

/// calamine 범위는 첫 비어 있지 않은 셀부터 시작하므로 절대 좌표로 다시 편다
fn grid_from_range(range: &Range<Data>) -> SheetGrid {
    let Some((last_row, last_col)) = range.end() else {
        return SheetGrid::default();
    };

    let rows = (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| range.get_value((row, col)).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    SheetGrid::new(rows)
}

/// 셀 값을 문자열로 (정수 값 실수는 "1500"처럼 소수점 없이)
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_render_without_fraction() {
        assert_eq!(cell_text(&Data::Float(1500.0)), "1500");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("-".into())), "-");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn range_is_expanded_to_absolute_coordinates() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Бюллетень".into()));
        range.set_value((3, 2), Data::Float(42.0));

        let grid = grid_from_range(&range);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.cell(0, 0), "");
        assert_eq!(grid.cell(2, 1), "Бюллетень");
        assert_eq!(grid.cell(3, 2), "42");
    }

    /// A열과 0행이 비어 있는 실제 형식의 BIFF8 불리틴 (15.03.2023, 거래 없음 1건, 합계 행 포함)
    const MARCH_15_XLS: &[u8] = include_bytes!("../../tests/fixtures/oil_xls_20230315162000.xls");

    #[test]
    fn first_sheet_keeps_absolute_coordinates() {
        let grid = read_first_sheet(MARCH_15_XLS).unwrap();

        assert_eq!(grid.height(), 14);
        assert_eq!(grid.cell(0, 1), "");
        assert_eq!(grid.cell(3, 1), "Дата торгов: 15.03.2023");
        assert_eq!(grid.cell(6, 1), "Единица измерения: Метрическая тонна");
        assert_eq!(grid.cell(8, 14), "14");
    }

    #[test]
    fn extracts_real_workbook() {
        let bulletin = XlsExtractor.extract(MARCH_15_XLS).unwrap();

        assert_eq!(bulletin.date, "15.03.2023");
        let codes: Vec<&str> = bulletin
            .rows
            .iter()
            .map(|row| row.instrument_code.as_str())
            .collect();
        assert_eq!(codes, vec!["A100ANK060F", "A592ACH065F", "DTEKNYR065F"]);

        let first = &bulletin.rows[0];
        assert_eq!(first.delivery_basis_name, "Ангарск-группа станций");
        assert_eq!(first.volume_raw, "60");
        assert_eq!(first.total_raw, "5134700");
        assert_eq!(first.count_raw, "1");

        let diesel = &bulletin.rows[2];
        assert_eq!(diesel.total_raw, "7800000.5");
        assert_eq!(diesel.count_raw, "6");
    }

    #[test]
    fn garbage_bytes_are_a_spreadsheet_error() {
        let err = XlsExtractor.extract(b"<html>not a workbook</html>").unwrap_err();
        assert!(matches!(err, ScrapeError::Spreadsheet(_)));
    }
}
