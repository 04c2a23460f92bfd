/*!
 * Reporting functionality for marktree
 *
 * Renders a short summary table of a finished copy using tabled.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::CopyStats;
use crate::utils::pluralize;
use crate::worker::RequestKind;

/// Everything the summary shows about one copy
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// Operation that produced the output
    pub kind: RequestKind,
    /// Where the Markdown went (clipboard, file path, stdout)
    pub destination: String,
    /// Wall time of scan, read and format
    pub duration: Duration,
    /// Size of the rendered Markdown in bytes
    pub markdown_bytes: usize,
    /// Number of files covered
    pub files_count: usize,
    /// Disposition counters
    pub stats: CopyStats,
}

/// Report generator for copy results
pub struct Reporter;

impl Reporter {
    /// Format a number with human-readable units
    fn format_number(num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// One-line confirmation, phrased per operation
    pub fn message(report: &CopyReport) -> String {
        let files = pluralize(report.files_count, "file", "files");
        let contents = pluralize(report.files_count, "file content", "file contents");
        match report.kind {
            RequestKind::Tree => format!("Directory tree ({}) copied as Markdown.", files),
            RequestKind::ReadFilesPaths | RequestKind::ReadFilesSelected => {
                format!("{} copied as Markdown.", capitalize(&contents))
            }
            RequestKind::TreeAndReadFilesPaths | RequestKind::TreeAndReadFilesSelected => {
                format!("Directory tree and {} copied as Markdown.", contents)
            }
            RequestKind::ShellExec => "Command output copied as Markdown.".to_string(),
        }
    }

    /// Summary table of the copy
    pub fn table(report: &CopyReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let stats = &report.stats;
        let mut rows = vec![
            SummaryRow {
                key: "Destination",
                value: report.destination.clone(),
            },
            SummaryRow {
                key: "Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Files",
                value: Self::format_number(report.files_count),
            },
        ];

        if report.kind != RequestKind::Tree && report.kind != RequestKind::ShellExec {
            rows.push(SummaryRow {
                key: "Binary / Unreadable / Empty",
                value: format!("{} / {} / {}", stats.binary, stats.unreadable, stats.empty),
            });
            rows.push(SummaryRow {
                key: "Total Lines",
                value: Self::format_number(stats.lines),
            });
            rows.push(SummaryRow {
                key: "LLM Tokens",
                value: format!("{} (estimated)", Self::format_number(stats.chars / 4)),
            });
        }

        rows.push(SummaryRow {
            key: "Markdown Size",
            value: format!("{} bytes", Self::format_number(report.markdown_bytes)),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    /// Confirmation line followed by the table
    pub fn render(report: &CopyReport) -> String {
        format!("{}\n{}", Self::message(report), Self::table(report))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
