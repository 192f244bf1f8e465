pub mod chart;
pub mod markdown;
pub mod sections;

use crate::analyze::{Analysis, Analyzer, DataAnalysis};
use crate::model::Result;
use chrono::NaiveDateTime;
use chart::ChartRenderer;
use log::{info, warn};
use markdown::MarkdownReport;
use std::fs;
use std::path::{Path, PathBuf};

/// Piece of report content, independent of how it is written out.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(u8, String),
    Paragraph(String),
    Bullets(Vec<String>),
    Image { alt: String, png: Vec<u8> },
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Written(PathBuf),
    InsufficientData,
}

/// Analyzes the fetched tables and writes the report to `dir/file_name`.
///
/// Nothing is written when the roster or the issues are empty.
pub fn generate_markdown(
    data: DataAnalysis,
    charts: &dyn ChartRenderer,
    dir: &Path,
    file_name: &str,
) -> Result<ReportOutcome> {
    let Analysis::Ready(analyzed) = data.analyze_issues() else {
        warn!("⚠️ Could not generate the report: insufficient data.");
        return Ok(ReportOutcome::InsufficientData);
    };
    let markdown = analyzed.report_create(charts);
    let path = write_markdown(dir, file_name, &markdown)?;
    Ok(ReportOutcome::Written(path))
}

pub fn write_markdown(dir: &Path, file_name: &str, markdown: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, markdown)?;
    info!("📄 Markdown generated at: {}", path.display());
    Ok(path)
}

/// `base/ReportDDMMYYYY-HHhMMmin` for the given local time.
pub fn timestamped_dir(base: &Path, now: &NaiveDateTime) -> PathBuf {
    base.join(now.format("Report%d%m%Y-%Hh%Mmin").to_string())
}
