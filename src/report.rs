use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::{
    accumulate::Accumulator, normalize::OUTPUT_COLUMNS, period::FileMetadata, sheet::CellValue,
};

/// `<prefix>-<YYYY>-<MM>.xlsx`
pub fn report_file_name(prefix: &str, last: &FileMetadata) -> String {
    format!("{}-{}-{}.xlsx", prefix, last.date_year(), last.date_month())
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<()> {
    match cell {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        CellValue::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
    }
    Ok(())
}

/// Write the accumulated rows, header first, as a single-sheet workbook in
/// `output_dir`. The file is named after `last`, the final accepted file.
#[instrument(level = "info", skip(acc, last, output_dir), fields(rows = acc.len()))]
pub fn write_report(
    acc: &Accumulator,
    last: &FileMetadata,
    output_dir: &Path,
    prefix: &str,
) -> Result<PathBuf> {
    let path = output_dir.join(report_file_name(prefix, last));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = acc.header().unwrap_or(&OUTPUT_COLUMNS);
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, row) in acc.rows().iter().enumerate() {
        for (col, cell) in row.cells().iter().enumerate() {
            write_cell(sheet, i as u32 + 1, col as u16, cell)?;
        }
    }

    workbook
        .save(&path)
        .with_context(|| format!("saving report {}", path.display()))?;
    info!("final Excel file saved as: {}", path.display());
    Ok(path)
}

/// Dump the staging data as CSV: header once, then every row in order.
pub fn write_staging<W: Write>(acc: &Accumulator, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    if let Some(header) = acc.header() {
        wtr.write_record(header)?;
    }
    for row in acc.rows() {
        wtr.write_record(row.cells().iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Replace whatever is at `path` with the current staging data.
pub fn write_staging_file(acc: &Accumulator, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating staging directory {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("creating staging file {}", path.display()))?;
    write_staging(acc, file)?;
    info!("staging data written to {}", path.display());
    Ok(())
}

/// Remove a staging file left by an earlier folder or run.
pub fn clear_staging_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed stale staging file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("removing staging file {}", path.display())),
    }
}
