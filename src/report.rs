//! Plain-text rendering of column summaries for terminal output.

use std::borrow::Cow;

use crate::stats::ColumnSummary;

const SUMMARY_HEADERS: [&str; 7] = ["column", "type", "count", "mean", "std", "min", "max"];
const COLUMN_GAP: &str = "  ";

pub fn summary_rows(summaries: &[ColumnSummary]) -> Vec<Vec<String>> {
    summaries
        .iter()
        .map(|summary| {
            vec![
                summary.name.clone(),
                summary.column_type.to_string(),
                summary.count.to_string(),
                format_metric(summary.mean),
                format_metric(summary.std),
                format_metric(summary.min),
                format_metric(summary.max),
            ]
        })
        .collect()
}

pub fn render_summary_table(summaries: &[ColumnSummary]) -> String {
    let headers = SUMMARY_HEADERS.map(str::to_string);
    render_table(&headers, &summary_rows(summaries))
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the
/// header. Cells wider than the header widen their column.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&sanitize_cell(cell)));
        }
    }

    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(headers, &widths));
    lines.push(format_line(&rule, &rule_widths));
    lines.extend(rows.iter().map(|row| format_line(row, &widths)));

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let cell = sanitize_cell(cell);
            let padding = width.saturating_sub(display_width(&cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>();
    padded.join(COLUMN_GAP).trim_end().to_string()
}

fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 => format!("{value:.0}"),
        Some(value) => format!("{value:.4}"),
        None => String::new(),
    }
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
