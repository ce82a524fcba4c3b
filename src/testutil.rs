//! Fixtures shared by the unit tests.

use anyhow::Result;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::sheet::CellValue;

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fsconsolidate=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Write an `.xlsx` with the given sheets. `Empty` cells are left unwritten.
pub fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<CellValue>>)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    CellValue::Empty => {}
                    CellValue::Number(n) => {
                        sheet.write_number(r, c, *n)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(r, c, *b)?;
                    }
                    CellValue::Text(s) => {
                        sheet.write_string(r, c, s)?;
                    }
                }
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

/// A month sheet in the usual export layout: three preamble rows, the
/// `Account No.` header at row 3, then one row per `(code, name, amount)`.
pub fn trial_balance(lines: &[(&str, &str, f64)]) -> Vec<Vec<CellValue>> {
    let mut rows = vec![
        vec![CellValue::text("ANI Co., Ltd.")],
        vec![CellValue::text("Trial Balance"), CellValue::text("Branch")],
        vec![],
        vec![
            CellValue::text("Account No."),
            CellValue::text("Account Description"),
            CellValue::text("THB"),
        ],
    ];
    for (code, name, amount) in lines {
        rows.push(vec![
            CellValue::text(*code),
            CellValue::text(*name),
            CellValue::Number(*amount),
        ]);
    }
    rows
}

/// All rows of the first sheet of a workbook.
pub fn read_first_sheet(path: &Path) -> Result<Vec<Vec<Data>>> {
    let mut wb: Xlsx<_> = open_workbook(path)?;
    let first = wb.sheet_names()[0].clone();
    let range = wb.worksheet_range(&first)?;
    Ok(range.rows().map(|r| r.to_vec()).collect())
}
