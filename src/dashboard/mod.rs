//! Dashboard configuration model and the style-specific generators.
//!
//! A [`DashboardConfiguration`] is a renderer-agnostic document: KPI tiles,
//! chart specifications with their series data, and the insight list. The
//! three [`DashboardStyle`]s only differ in which KPIs and charts they select
//! and, for `powerbi`, in grid placement hints.
//!
//! Generation is deterministic for a given table, style and settings. The
//! `generatedAt` stamp is the only exception and is ignored by `PartialEq`.

mod ml;
mod powerbi;
mod simple;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    config::EngineSettings,
    error::DashboardError,
    insights::{self, Insight},
    stats,
    table::Table,
};

pub use powerbi::{GRID_COLUMNS, grid_position};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardStyle {
    #[default]
    Simple,
    Ml,
    Powerbi,
}

impl DashboardStyle {
    pub const ALL: [DashboardStyle; 3] = [
        DashboardStyle::Simple,
        DashboardStyle::Ml,
        DashboardStyle::Powerbi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardStyle::Simple => "simple",
            DashboardStyle::Ml => "ml",
            DashboardStyle::Powerbi => "powerbi",
        }
    }
}

impl fmt::Display for DashboardStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardStyle {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        DashboardStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| DashboardError::UnknownStyle(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiValue {
    Count(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: KpiValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<String>,
}

impl Kpi {
    /// KPI whose value is pre-formatted with thousands separators.
    pub fn formatted(label: &str, count: usize) -> Self {
        Self {
            label: label.to_string(),
            value: KpiValue::Text(group_thousands(count)),
            change: None,
        }
    }

    pub fn count(label: &str, count: usize) -> Self {
        Self {
            label: label.to_string(),
            value: KpiValue::Count(count as u64),
            change: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Scatter,
    Heatmap,
    Pie,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Count(u64),
    Number(f64),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<AxisValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<AxisValue>>,
    #[serde(rename = "type")]
    pub trace_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitle {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLayout {
    pub xaxis: AxisTitle,
    pub yaxis: AxisTitle,
}

impl AxisLayout {
    pub fn titled(x: &str, y: &str) -> Self {
        Self {
            xaxis: AxisTitle {
                title: x.to_string(),
            },
            yaxis: AxisTitle {
                title: y.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub title: String,
    pub data: Vec<Series>,
    pub layout: AxisLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_pos: Option<GridPos>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfiguration {
    pub layout: DashboardStyle,
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
    pub insights: Vec<Insight>,
    /// Wall-clock time of generation. Not part of equality.
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the source bytes, when generated from bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,
}

impl PartialEq for DashboardConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.layout == other.layout
            && self.kpis == other.kpis
            && self.charts == other.charts
            && self.insights == other.insights
            && self.source_digest == other.source_digest
    }
}

impl DashboardConfiguration {
    pub fn chart(&self, id: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|chart| chart.id == id)
    }

    pub fn kpi(&self, label: &str) -> Option<&Kpi> {
        self.kpis.iter().find(|kpi| kpi.label == label)
    }
}

/// KPI tiles and charts selected by one style.
#[derive(Debug, Default)]
pub(crate) struct Panels {
    pub kpis: Vec<Kpi>,
    pub charts: Vec<ChartSpec>,
}

pub fn generate(
    table: &Table,
    style: DashboardStyle,
    settings: &EngineSettings,
) -> DashboardConfiguration {
    let panels = match style {
        DashboardStyle::Simple => simple::build(table, settings),
        DashboardStyle::Ml => ml::build(table, settings),
        DashboardStyle::Powerbi => powerbi::build(table, settings),
    };
    let summaries = stats::summarize(table);
    let insights = insights::generate_insights(table, &summaries, settings);
    info!(
        "Generated {style} dashboard: {} KPI(s), {} chart(s), {} insight(s)",
        panels.kpis.len(),
        panels.charts.len(),
        insights.len()
    );
    DashboardConfiguration {
        layout: style,
        kpis: panels.kpis,
        charts: panels.charts,
        insights,
        generated_at: Utc::now(),
        source_digest: None,
    }
}

pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
