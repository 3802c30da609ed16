//! Heuristic observations about a table.
//!
//! Two passes run over the numeric columns in header order: an outlier pass
//! over every column, then a trend pass over every column. Findings are kept
//! in discovery order and capped; an empty result is replaced by a single
//! general insight so callers always have something to show.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineSettings,
    stats::{self, ColumnSummary},
    table::{Column, Table},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Outlier,
    Trend,
    Correlation,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Insight {
    pub fn stable_data() -> Self {
        Self {
            kind: InsightKind::General,
            title: "Consistent Data".to_string(),
            description:
                "No significant outliers or strong trends detected. The data appears stable."
                    .to_string(),
            severity: Severity::Info,
        }
    }
}

/// Reasons a column was passed over by a heuristic.
#[derive(Debug, Clone, PartialEq)]
enum Skip {
    NotNumeric,
    NoSpread,
    TooFewValues(usize),
    ZeroBaseline,
    NonFinite,
}

pub fn generate_insights(
    table: &Table,
    summaries: &[ColumnSummary],
    settings: &EngineSettings,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    for summary in summaries.iter().filter(|summary| summary.is_numeric()) {
        match detect_outlier(summary, settings.outlier_z_threshold) {
            Ok(Some(insight)) => insights.push(insight),
            Ok(None) => {}
            Err(skip) => debug!("Outlier check skipped '{}': {skip:?}", summary.name),
        }
    }

    for column in table.columns().iter().filter(|column| column.is_numeric()) {
        match detect_trend(column, settings) {
            Ok(Some(insight)) => insights.push(insight),
            Ok(None) => {}
            Err(Skip::NonFinite) => warn!(
                "Trend check for '{}' produced a non-finite change; column skipped",
                column.name()
            ),
            Err(skip) => debug!("Trend check skipped '{}': {skip:?}", column.name()),
        }
    }

    if insights.is_empty() {
        insights.push(Insight::stable_data());
    }
    insights.truncate(settings.max_insights.max(1));
    insights
}

fn detect_outlier(summary: &ColumnSummary, threshold: f64) -> Result<Option<Insight>, Skip> {
    let (Some(mean), Some(std), Some(max)) = (summary.mean, summary.std, summary.max) else {
        return Err(Skip::NotNumeric);
    };
    if std <= 0.0 {
        return Err(Skip::NoSpread);
    }
    let z = (max - mean) / std;
    if !z.is_finite() {
        return Err(Skip::NonFinite);
    }
    if z <= threshold {
        return Ok(None);
    }
    Ok(Some(Insight {
        kind: InsightKind::Outlier,
        title: format!("Extreme Value in {}", summary.name),
        description: format!(
            "The maximum value ({max:.2}) is significantly higher (> {threshold}σ) than the average ({mean:.2})."
        ),
        severity: Severity::Warning,
    }))
}

fn detect_trend(column: &Column, settings: &EngineSettings) -> Result<Option<Insight>, Skip> {
    let values = column.numeric_values().collect::<Vec<_>>();
    if values.len() <= settings.trend_min_values {
        return Err(Skip::TooFewValues(values.len()));
    }
    // the second half takes the extra value when the length is odd
    let half = values.len() / 2;
    let (first, second) = values.split_at(half);
    let (Some(first_mean), Some(second_mean)) = (stats::mean(first), stats::mean(second)) else {
        return Err(Skip::TooFewValues(values.len()));
    };
    if first_mean == 0.0 {
        return Err(Skip::ZeroBaseline);
    }
    let change = (second_mean - first_mean) / first_mean * 100.0;
    if !change.is_finite() {
        return Err(Skip::NonFinite);
    }
    if change.abs() <= settings.trend_change_percent {
        return Ok(None);
    }

    let increasing = change > 0.0;
    let (direction, verb, severity) = if increasing {
        ("Upward", "increased", Severity::Positive)
    } else {
        ("Downward", "decreased", Severity::Info)
    };
    Ok(Some(Insight {
        kind: InsightKind::Trend,
        title: format!("{direction} Trend in {}", column.name()),
        description: format!(
            "Values have {verb} by approximately {:.1}% from the first half to the second half of the dataset.",
            change.abs()
        ),
        severity,
    }))
}
