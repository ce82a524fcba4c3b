use anyhow::{bail, Context, Result};
use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{fmt, path::Path};
use tracing::{trace, warn};

/// `Mon-YYYY`, letters in any case.
pub static FOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)-([0-9]{4})$").expect("valid folder regex"));

/// `_FS` marker, optional whitespace/underscores, then `YY-MM`.
static FILE_STAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_FS[\s_]*?([0-9]{2})-([0-9]{2})").expect("valid file stamp regex")
});

/// Delimiter separating the branch code from the rest of a file name.
pub const BRANCH_DELIMITER: &str = "_FS";

/// A reporting month, e.g. June 2025.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub month: Month,
}

impl Period {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Four digit year, `"2025"`.
    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }

    /// Two digit month, `"06"`.
    pub fn month_str(&self) -> String {
        format!("{:02}", self.month.number_from_month())
    }

    /// Capitalised three letter abbreviation, also the name of the sheet to read.
    pub fn sheet_name(&self) -> &'static str {
        &self.month.name()[..3]
    }

    /// First day of the month as `DD/MM/YYYY`.
    pub fn docu_date(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month.number_from_month(), 1)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| format!("01/{}/{}", self.month_str(), self.year_str()))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sheet_name(), self.year_str())
    }
}

/// True when `name` has the `Mon-YYYY` shape. Says nothing about whether the
/// month token is a real month.
pub fn is_period_folder_name(name: &str) -> bool {
    FOLDER_RE.is_match(name)
}

/// Parse a `Mon-YYYY` folder name (case-insensitive) into a [`Period`].
///
/// Fails when the shape is wrong or the month token is not one of the twelve
/// three letter abbreviations. Full month names such as `June` are rejected.
pub fn parse_folder_name(name: &str) -> Result<Period> {
    let caps = FOLDER_RE
        .captures(name)
        .with_context(|| format!("folder name `{}` does not match Mon-YYYY", name))?;

    let token = &caps[1];
    if token.len() != 3 {
        bail!("folder `{}`: `{}` is not a three letter month", name, token);
    }
    let month: Month = token
        .parse()
        .map_err(|_| anyhow::anyhow!("folder `{}`: unrecognised month `{}`", name, token))?;
    let year: i32 = caps[2]
        .parse()
        .with_context(|| format!("folder `{}`: bad year", name))?;

    trace!(folder = name, year, month = month.name(), "parsed folder period");
    Ok(Period::new(year, month))
}

/// Everything derived from one input file's name plus its folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub file_name: String,
    pub org_code: String,
    pub branch_org_code: String,
    /// Period the rows are tagged with; always the folder's.
    pub period: Period,
    /// `YY-MM` embedded after the `_FS` marker, as `(2000 + YY, MM)`.
    pub file_period: (i32, u32),
}

impl FileMetadata {
    pub fn docu_date(&self) -> String {
        self.period.docu_date()
    }

    pub fn date_year(&self) -> String {
        self.period.year_str()
    }

    pub fn date_month(&self) -> String {
        self.period.month_str()
    }
}

/// Derive [`FileMetadata`] from a spreadsheet file name such as
/// `BKK01_FS25-06.xlsx`. Returns `None` when the name lacks the
/// `_FS<YY>-<MM>` stamp; the caller skips such files.
pub fn parse_file_name(file_name: &str, org_code: &str, period: Period) -> Option<FileMetadata> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .trim();

    let caps = FILE_STAMP_RE.captures(stem)?;
    let yy: i32 = caps[1].parse().ok()?;
    let mm: u32 = caps[2].parse().ok()?;
    let file_period = (2000 + yy, mm);

    let branch = stem
        .split_once(BRANCH_DELIMITER)
        .map(|(head, _)| head)
        .unwrap_or(stem);

    if file_period != (period.year, period.month.number_from_month()) {
        warn!(
            file = file_name,
            folder_period = %period,
            "file stamp {:02}-{:02} differs from folder, using folder period",
            yy,
            mm
        );
    }

    Some(FileMetadata {
        file_name: file_name.to_string(),
        org_code: org_code.to_string(),
        branch_org_code: branch.to_string(),
        period,
        file_period,
    })
}
