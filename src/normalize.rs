use tracing::debug;

use crate::{
    period::FileMetadata,
    sheet::{CellValue, DataBlock},
    skip::SkipReason,
};

/// Source label → canonical label, in output order.
pub const COLUMN_MAP: [(&str, &str); 3] = [
    ("Account No.", "AccCode"),
    ("Account Description", "AccName"),
    ("THB", "AcccumMonthAmnt"),
];

/// Header of the consolidated report.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "OrgCode",
    "BranchOrgCode",
    "DocuDate",
    "DateYear",
    "DateMonth",
    "AccCode",
    "AccName",
    "AcccumMonthAmnt",
];

/// One account line tagged with the metadata of the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub org_code: String,
    pub branch_org_code: String,
    pub docu_date: String,
    pub date_year: String,
    pub date_month: String,
    pub acc_code: CellValue,
    pub acc_name: CellValue,
    pub accum_month_amnt: CellValue,
}

impl NormalizedRow {
    /// Cells in [`OUTPUT_COLUMNS`] order.
    pub fn cells(&self) -> [CellValue; 8] {
        [
            CellValue::text(&self.org_code),
            CellValue::text(&self.branch_org_code),
            CellValue::text(&self.docu_date),
            CellValue::text(&self.date_year),
            CellValue::text(&self.date_month),
            self.acc_code.clone(),
            self.acc_name.clone(),
            self.accum_month_amnt.clone(),
        ]
    }
}

/// The three canonical columns before metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLine {
    pub acc_code: CellValue,
    pub acc_name: CellValue,
    pub accum_month_amnt: CellValue,
}

/// Check the required labels and project each row down to them.
pub fn project_accounts(block: &DataBlock) -> Result<Vec<AccountLine>, SkipReason> {
    let missing: Vec<String> = COLUMN_MAP
        .iter()
        .filter(|(src, _)| block.column_index(src).is_none())
        .map(|(src, _)| src.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SkipReason::MissingColumns(missing));
    }

    let idx: Vec<usize> = COLUMN_MAP
        .iter()
        .filter_map(|(src, _)| block.column_index(src))
        .collect();
    let cell = |row: &[CellValue], i: usize| row.get(i).cloned().unwrap_or(CellValue::Empty);

    Ok(block
        .rows
        .iter()
        .map(|row| AccountLine {
            acc_code: cell(row, idx[0]),
            acc_name: cell(row, idx[1]),
            accum_month_amnt: cell(row, idx[2]),
        })
        .collect())
}

/// Drop lines whose account code is null or blank.
pub fn drop_blank_codes(lines: Vec<AccountLine>) -> Vec<AccountLine> {
    lines
        .into_iter()
        .filter(|l| !l.acc_code.is_blank())
        .collect()
}

/// Validate, relabel, filter and tag a data block.
pub fn normalize(block: &DataBlock, meta: &FileMetadata) -> Result<Vec<NormalizedRow>, SkipReason> {
    let lines = project_accounts(block)?;
    let total = lines.len();
    let kept = drop_blank_codes(lines);
    debug!(
        file = %meta.file_name,
        kept = kept.len(),
        dropped = total - kept.len(),
        "filtered blank account codes"
    );

    let docu_date = meta.docu_date();
    let date_year = meta.date_year();
    let date_month = meta.date_month();
    Ok(kept
        .into_iter()
        .map(|l| NormalizedRow {
            org_code: meta.org_code.clone(),
            branch_org_code: meta.branch_org_code.clone(),
            docu_date: docu_date.clone(),
            date_year: date_year.clone(),
            date_month: date_month.clone(),
            acc_code: l.acc_code,
            acc_name: l.acc_name,
            accum_month_amnt: l.accum_month_amnt,
        })
        .collect())
}
