use calamine::{open_workbook, Data, Range, Reader, Xlsx, XlsxError};
use std::{fmt, path::Path};
use tracing::{debug, instrument};

use crate::skip::SkipReason;

/// Label whose row carries the real column headers.
pub const ANCHOR_LABEL: &str = "Account No.";

/// A single spreadsheet cell, reduced to what the report needs.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Null, or text that is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }
}

impl From<&Data> for CellValue {
    fn from(d: &Data) -> Self {
        match d {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// The used area of one worksheet, row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    /// Absolute sheet row of `rows[0]`.
    pub first_row: u32,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { first_row: 0, rows }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let first_row = range.start().map(|(r, _)| r).unwrap_or(0);
        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();
        Self { first_row, rows }
    }
}

/// Header labels plus the rows beneath them.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataBlock {
    /// Index of the left-most column labelled `label`.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }
}

/// Index of the first row that has a cell whose text is exactly `anchor`.
pub fn find_anchor_row(rows: &[Vec<CellValue>], anchor: &str) -> Option<usize> {
    rows.iter().position(|row| {
        row.iter()
            .any(|cell| matches!(cell, CellValue::Text(s) if s == anchor))
    })
}

/// Split a grid at its anchor row: the anchor row becomes the (trimmed)
/// header and every row below it is data.
pub fn extract_block(grid: &SheetGrid, anchor: &str) -> Result<DataBlock, SkipReason> {
    let idx = find_anchor_row(&grid.rows, anchor).ok_or(SkipReason::AnchorNotFound)?;
    debug!(
        row = grid.first_row as usize + idx,
        "found `{}` anchor row", anchor
    );

    let headers = grid.rows[idx]
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();
    let rows = grid.rows[idx + 1..].to_vec();
    Ok(DataBlock { headers, rows })
}

/// Open an `.xlsx` workbook and pull out the grid of `sheet_name`.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<SheetGrid, SkipReason> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())
        .map_err(|e: XlsxError| SkipReason::Unreadable(e.to_string()))?;

    if !workbook.sheet_names().iter().any(|s| s == sheet_name) {
        return Err(SkipReason::SheetMissing(sheet_name.to_string()));
    }

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e: XlsxError| SkipReason::Unreadable(e.to_string()))?;
    Ok(SheetGrid::from_range(&range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{init_test_logging, write_workbook};
    use anyhow::Result;
    use tempfile::TempDir;

    fn t(s: &str) -> CellValue {
        CellValue::text(s)
    }

    fn sample_grid() -> SheetGrid {
        SheetGrid::from_rows(vec![
            vec![t("ANI Group"), CellValue::Empty],
            vec![t("Trial balance"), t("June 2025")],
            vec![CellValue::Empty],
            vec![t("Account No."), t(" Account Description "), t("THB")],
            vec![t("1001"), t("Cash"), CellValue::Number(1500.5)],
            vec![t("1002"), t("Bank"), CellValue::Number(-20.0)],
        ])
    }

    #[test]
    fn anchor_first_occurrence_wins() {
        let mut rows = sample_grid().rows;
        assert_eq!(find_anchor_row(&rows, ANCHOR_LABEL), Some(3));
        rows.push(vec![t("Account No.")]);
        assert_eq!(find_anchor_row(&rows, ANCHOR_LABEL), Some(3));
    }

    #[test]
    fn anchor_requires_exact_text() {
        let rows = vec![
            vec![t("Account No")],
            vec![t("account no.")],
            vec![t(" Account No. ")],
            vec![CellValue::Number(1.0)],
        ];
        assert_eq!(find_anchor_row(&rows, ANCHOR_LABEL), None);
        assert_eq!(find_anchor_row(&[], ANCHOR_LABEL), None);
    }

    #[test]
    fn block_headers_trimmed_and_rows_below() {
        let block = extract_block(&sample_grid(), ANCHOR_LABEL).unwrap();
        assert_eq!(block.headers, vec!["Account No.", "Account Description", "THB"]);
        assert_eq!(block.rows.len(), 2);
        assert_eq!(block.rows[0][0], t("1001"));
        assert_eq!(block.column_index("THB"), Some(2));
        assert_eq!(block.column_index("USD"), None);
    }

    #[test]
    fn missing_anchor_is_a_skip() {
        let grid = SheetGrid::from_rows(vec![vec![t("nothing here")]]);
        assert_eq!(
            extract_block(&grid, ANCHOR_LABEL),
            Err(SkipReason::AnchorNotFound)
        );
    }

    #[test]
    fn blank_cells() {
        assert!(CellValue::Empty.is_blank());
        assert!(t("   ").is_blank());
        assert!(!t(" 1 ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert_eq!(CellValue::Number(1001.0).to_string(), "1001");
    }

    #[test]
    fn reads_named_sheet_from_xlsx() -> Result<()> {
        init_test_logging();
        let dir = TempDir::new()?;
        let path = dir.path().join("BKK01_FS25-06.xlsx");
        write_workbook(
            &path,
            &[
                ("May", vec![vec![t("wrong sheet")]]),
                ("Jun", sample_grid().rows),
            ],
        )?;

        let grid = read_sheet(&path, "Jun").unwrap();
        assert_eq!(find_anchor_row(&grid.rows, ANCHOR_LABEL), Some(3));
        assert_eq!(grid.rows[4][2], CellValue::Number(1500.5));

        assert_eq!(
            read_sheet(&path, "Jul"),
            Err(SkipReason::SheetMissing("Jul".into()))
        );
        Ok(())
    }

    #[test]
    fn unreadable_workbook_is_a_skip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip")?;
        assert!(matches!(
            read_sheet(&path, "Jun"),
            Err(SkipReason::Unreadable(_))
        ));
        Ok(())
    }
}
