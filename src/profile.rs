//! Upload-time profile of a CSV file: inferred schema, per-column statistics,
//! pairwise correlations of the numeric columns and a bounded row preview,
//! suitable for storing next to the file record.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineSettings,
    frequency::FrequencyAccumulator,
    stats::{self, ColumnSummary},
    table::{Column, ColumnType, Table},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    #[serde(flatten)]
    pub summary: ColumnSummary,
    pub missing: usize,
    pub distinct: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProfile {
    pub row_count: usize,
    pub column_count: usize,
    pub skipped_rows: usize,
    pub columns: Vec<ColumnProfile>,
    /// Pearson coefficients of every ordered pair of numeric columns, row-major
    /// in header order. Absent with fewer than two numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlations: Option<Vec<Correlation>>,
    /// Leading rows in header order; `None` marks a missing cell.
    pub preview: Vec<Vec<Option<String>>>,
}

/// Pairs where either column has no variance are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub x: String,
    pub y: String,
    pub coefficient: f64,
}

impl FileProfile {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|profile| profile.summary.name == name)
    }

    pub fn correlation(&self, x: &str, y: &str) -> Option<f64> {
        self.correlations
            .as_deref()?
            .iter()
            .find(|entry| entry.x == x && entry.y == y)
            .map(|entry| entry.coefficient)
    }
}

pub fn profile_table(table: &Table, settings: &EngineSettings) -> FileProfile {
    let columns = table.columns().iter().map(profile_column).collect();
    let correlations = correlation_matrix(table);
    let preview = (0..table.row_count().min(settings.preview_rows))
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|column| column.cells()[row].as_display())
                .collect()
        })
        .collect::<Vec<_>>();
    info!(
        "Profiled {} row(s) across {} column(s); preview holds {} row(s)",
        table.row_count(),
        table.column_count(),
        preview.len()
    );
    FileProfile {
        row_count: table.row_count(),
        column_count: table.column_count(),
        skipped_rows: table.skipped_rows(),
        columns,
        correlations,
        preview,
    }
}

fn correlation_matrix(table: &Table) -> Option<Vec<Correlation>> {
    let numeric = table.columns_of(ColumnType::Numeric).collect::<Vec<_>>();
    if numeric.len() < 2 {
        return None;
    }
    let mut matrix = Vec::with_capacity(numeric.len() * numeric.len());
    for x in &numeric {
        for y in &numeric {
            match stats::correlation(x, y) {
                Some(coefficient) => matrix.push(Correlation {
                    x: x.name().to_string(),
                    y: y.name().to_string(),
                    coefficient,
                }),
                None => debug!(
                    "No correlation for '{}' and '{}': no variance",
                    x.name(),
                    y.name()
                ),
            }
        }
    }
    Some(matrix)
}

fn profile_column(column: &Column) -> ColumnProfile {
    let summary = stats::summarize_column(column);
    let mut values = FrequencyAccumulator::new();
    for cell in column.cells() {
        if let Some(display) = cell.as_display() {
            values.ingest(&display);
        }
    }
    let median = if column.is_numeric() {
        stats::median(&column.numeric_values().collect::<Vec<_>>())
    } else {
        None
    };
    ColumnProfile {
        summary,
        missing: column.missing_count(),
        distinct: values.distinct(),
        median,
    }
}
