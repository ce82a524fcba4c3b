//! Consolidates monthly branch trial-balance workbooks into one report per month.
//!
//! The input root holds `Mon-YYYY` folders of `<branch>_FS<YY>-<MM>.xlsx`
//! files. Each folder becomes one `<org>-<YYYY>-<MM>.xlsx` report.

pub mod accumulate;
pub mod config;
pub mod normalize;
pub mod period;
pub mod processor;
pub mod report;
pub mod run;
pub mod sheet;
pub mod skip;

#[cfg(test)]
pub(crate) mod testutil;
