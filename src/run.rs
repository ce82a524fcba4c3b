use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    period::is_period_folder_name,
    processor::{FolderProcessor, FolderSummary},
};

/// Where the scan currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    ScanningFolders,
    ProcessingFolder(String),
    Done,
}

/// Outcome of a whole run over the input root.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub folders: Vec<FolderSummary>,
    /// Root entries that were not month folders, with the reason.
    pub skipped_entries: Vec<(String, String)>,
}

impl RunSummary {
    pub fn reports_written(&self) -> usize {
        self.folders.iter().filter(|f| f.output.is_some()).count()
    }

    pub fn files_skipped(&self) -> usize {
        self.folders.iter().map(|f| f.skipped.len()).sum()
    }
}

/// Walks the input root and runs one [`FolderProcessor`] per month folder.
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    state: RunState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            state: RunState::ScanningFolders,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "state change");
        self.state = next;
    }

    /// Root entries sorted by name.
    fn entries(&self) -> Result<Vec<PathBuf>> {
        let dir = &self.settings.input_dir;
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("reading input directory {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }

    /// Validate the settings, then process every month folder in name order.
    ///
    /// A month folder whose month cannot be recognised aborts the whole run;
    /// anything else that is not a month folder is skipped.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.settings.validate()?;
        let mut summary = RunSummary::default();

        for path in self.entries()? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if !path.is_dir() {
                info!("Skipping {} - not a folder", name);
                summary.skipped_entries.push((name, "not a folder".into()));
                continue;
            }
            if !is_period_folder_name(&name) {
                info!("Skipping folder {} - name is not Mon-YYYY", name);
                summary
                    .skipped_entries
                    .push((name, "name is not Mon-YYYY".into()));
                continue;
            }

            self.transition(RunState::ProcessingFolder(name.clone()));
            let processor = FolderProcessor::new(&path, self.settings)?;
            info!(folder = %name, period = %processor.period(), "processing folder");
            let folder_summary = processor.run()?;
            if folder_summary.output.is_none() {
                warn!("folder {} produced no report", name);
            }
            summary.folders.push(folder_summary);
            self.transition(RunState::ScanningFolders);
        }

        self.transition(RunState::Done);
        Ok(summary)
    }
}
