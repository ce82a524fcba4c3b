use anyhow::{bail, Result};
use tracing::trace;

use crate::{
    normalize::{NormalizedRow, OUTPUT_COLUMNS},
    period::{FileMetadata, Period},
};

/// Ordered, append-only staging area for one folder's rows.
///
/// Every `FolderProcessor` owns a fresh one, so nothing survives from an
/// earlier folder or an earlier run.
#[derive(Debug, Default)]
pub struct Accumulator {
    period: Option<Period>,
    files: usize,
    rows: Vec<NormalizedRow>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one accepted file's rows. The first call commits the header.
    ///
    /// All files in one accumulation must resolve to the same period, since the
    /// report is named after a single month.
    pub fn append(&mut self, meta: &FileMetadata, rows: Vec<NormalizedRow>) -> Result<()> {
        match self.period {
            Some(p) if p != meta.period => bail!(
                "{} resolves to {} but earlier files resolved to {}",
                meta.file_name,
                meta.period,
                p
            ),
            Some(_) => {}
            None => self.period = Some(meta.period),
        }
        trace!(file = %meta.file_name, rows = rows.len(), "appending");
        self.files += 1;
        self.rows.extend(rows);
        Ok(())
    }

    /// Column header, once at least one file has been appended.
    pub fn header(&self) -> Option<&'static [&'static str]> {
        if self.files > 0 {
            Some(&OUTPUT_COLUMNS)
        } else {
            None
        }
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of files appended so far, including ones with no surviving rows.
    pub fn file_count(&self) -> usize {
        self.files
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }
}
