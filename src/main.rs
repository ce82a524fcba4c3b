use anyhow::Result;
use fsconsolidate::{
    config::{Settings, DEFAULT_SETTINGS_FILE},
    run::Orchestrator,
};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) load settings ────────────────────────────────────────────
    let settings_path = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    info!("loading settings from {}", settings_path);
    let settings = Settings::load(&settings_path)?;

    // ─── 3) process every month folder ───────────────────────────────
    let summary = Orchestrator::new(&settings).run()?;

    info!(
        folders = summary.folders.len(),
        reports = summary.reports_written(),
        skipped_files = summary.files_skipped(),
        skipped_entries = summary.skipped_entries.len(),
        "all done"
    );
    Ok(())
}
