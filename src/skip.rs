use std::fmt;

/// Why an input file contributed nothing to the report.
///
/// These are not errors: the file is logged, left out, and the folder keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Name has no `_FS<YY>-<MM>` stamp.
    BadFileName,
    /// Workbook could not be opened or parsed.
    Unreadable(String),
    /// No worksheet named after the month.
    SheetMissing(String),
    /// No row holds the anchor label.
    AnchorNotFound,
    /// Required header labels absent after relabelling.
    MissingColumns(Vec<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BadFileName => f.write_str("file name does not match <branch>_FS<YY>-<MM>"),
            SkipReason::Unreadable(e) => write!(f, "cannot read workbook: {}", e),
            SkipReason::SheetMissing(name) => write!(f, "sheet '{}' not found", name),
            SkipReason::AnchorNotFound => {
                write!(f, "'{}' not found", crate::sheet::ANCHOR_LABEL)
            }
            SkipReason::MissingColumns(cols) => {
                write!(f, "missing columns: {}", cols.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            SkipReason::AnchorNotFound.to_string(),
            "'Account No.' not found"
        );
        assert_eq!(
            SkipReason::MissingColumns(vec!["THB".into(), "Account Description".into()])
                .to_string(),
            "missing columns: THB, Account Description"
        );
    }
}
