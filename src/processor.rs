use anyhow::{Context, Result};
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    accumulate::Accumulator,
    config::Settings,
    normalize::{normalize, NormalizedRow},
    period::{parse_file_name, parse_folder_name, FileMetadata, Period},
    report::{clear_staging_file, write_report, write_staging_file},
    sheet::{extract_block, read_sheet, ANCHOR_LABEL},
    skip::SkipReason,
};

/// Extension of the workbooks we pick up from a month folder.
pub const SPREADSHEET_EXT: &str = "xlsx";

/// Result of pushing one file through the pipeline.
#[derive(Debug)]
pub enum FileOutcome {
    Accepted {
        meta: FileMetadata,
        rows: Vec<NormalizedRow>,
    },
    Skipped(SkipReason),
}

/// What happened to one month folder.
#[derive(Debug, Clone)]
pub struct FolderSummary {
    pub folder: String,
    pub period: Period,
    pub accepted: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    pub rows: usize,
    /// Report workbook, when at least one file was accepted.
    pub output: Option<PathBuf>,
}

/// Pipeline for a single `Mon-YYYY` folder.
pub struct FolderProcessor<'a> {
    folder: PathBuf,
    period: Period,
    settings: &'a Settings,
}

impl<'a> FolderProcessor<'a> {
    /// Fails when the folder name is not `Mon-YYYY` with a real month; no file
    /// is touched in that case.
    pub fn new(folder: impl Into<PathBuf>, settings: &'a Settings) -> Result<Self> {
        let folder = folder.into();
        let name = folder
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("folder {} has no usable name", folder.display()))?;
        let period = parse_folder_name(name)?;
        Ok(Self {
            folder,
            period,
            settings,
        })
    }

    pub fn period(&self) -> Period {
        self.period
    }

    fn folder_name(&self) -> String {
        self.folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `*.xlsx` files directly inside the folder, in name order.
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&self.folder.to_string_lossy()),
            SPREADSHEET_EXT
        );
        let mut files: Vec<PathBuf> = glob(&pattern)
            .with_context(|| format!("bad glob pattern {}", pattern))?
            .filter_map(|entry| match entry {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("cannot read folder entry: {}", e);
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Name check, sheet lookup, anchor scan and normalisation for one file.
    #[instrument(level = "debug", skip(self, path), fields(file = %path.display()))]
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(meta) = parse_file_name(&file_name, &self.settings.org_code, self.period) else {
            return FileOutcome::Skipped(SkipReason::BadFileName);
        };

        let outcome = read_sheet(path, self.period.sheet_name())
            .and_then(|grid| extract_block(&grid, ANCHOR_LABEL))
            .and_then(|block| normalize(&block, &meta));
        match outcome {
            Ok(rows) => FileOutcome::Accepted { meta, rows },
            Err(reason) => FileOutcome::Skipped(reason),
        }
    }

    /// Process every candidate file, then write the report if anything was
    /// accepted. Per-file problems are logged and skipped; only I/O failures on
    /// the outputs come back as errors.
    ///
    /// The staging file is cleared first, so a folder with nothing accepted
    /// never leaves an earlier folder's rows behind.
    #[instrument(level = "info", skip(self), fields(folder = %self.folder.display()))]
    pub fn run(&self) -> Result<FolderSummary> {
        let mut summary = FolderSummary {
            folder: self.folder_name(),
            period: self.period,
            accepted: Vec::new(),
            skipped: Vec::new(),
            rows: 0,
            output: None,
        };
        clear_staging_file(&self.settings.staging_csv)?;
        let mut acc = Accumulator::new();
        let mut last: Option<FileMetadata> = None;

        for path in self.candidates()? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!(file = %file_name, "processing");

            match self.process_file(&path) {
                FileOutcome::Accepted { meta, rows } => {
                    info!(file = %file_name, rows = rows.len(), "accepted");
                    acc.append(&meta, rows)?;
                    summary.accepted.push(file_name);
                    last = Some(meta);
                }
                FileOutcome::Skipped(reason) => {
                    warn!("Skipping {} - {}", path.display(), reason);
                    summary.skipped.push((file_name, reason));
                }
            }
        }

        summary.rows = acc.len();
        match last {
            Some(meta) => summary.output = Some(self.finalize(&acc, &meta)?),
            None => info!("no usable files in {}, nothing written", summary.folder),
        }
        Ok(summary)
    }

    fn finalize(&self, acc: &Accumulator, last: &FileMetadata) -> Result<PathBuf> {
        let path = write_report(acc, last, &self.settings.output_dir, &self.settings.org_code)?;
        write_staging_file(acc, &self.settings.staging_csv)?;
        Ok(path)
    }
}
