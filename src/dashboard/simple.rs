use log::debug;

use super::{AxisLayout, AxisValue, ChartSpec, ChartType, Kpi, Marker, Panels, Series};
use crate::{
    config::EngineSettings,
    frequency,
    table::{Column, ColumnType, Table},
};

pub(crate) const BAR_CHART_ID: &str = "chart-1";
pub(crate) const HISTOGRAM_CHART_ID: &str = "chart-2";

pub(crate) fn build(table: &Table, settings: &EngineSettings) -> Panels {
    let kpis = vec![
        Kpi::formatted("Total Rows", table.row_count()),
        Kpi::formatted("Total Columns", table.column_count()),
    ];

    let mut charts = Vec::with_capacity(2);
    match table.first_column_of(ColumnType::Text) {
        Some(column) => charts.push(category_bar(column, settings)),
        None => debug!("No text column available; category bar chart omitted"),
    }
    match table.first_column_of(ColumnType::Numeric) {
        Some(column) => charts.push(distribution_histogram(column, settings)),
        None => debug!("No numeric column available; histogram omitted"),
    }

    Panels { kpis, charts }
}

fn category_bar(column: &Column, settings: &EngineSettings) -> ChartSpec {
    let counts = frequency::top_categories(column, settings.top_categories);
    // zero keeps every category, so the title reports what was kept
    let shown = match settings.top_categories {
        0 => counts.len(),
        cap => cap,
    };
    let (x, y): (Vec<_>, Vec<_>) = counts
        .into_iter()
        .map(|entry| {
            (
                AxisValue::Category(entry.value),
                AxisValue::Count(entry.count as u64),
            )
        })
        .unzip();
    ChartSpec {
        id: BAR_CHART_ID.to_string(),
        chart_type: ChartType::Bar,
        title: format!("Top {shown} {}", column.name()),
        data: vec![Series {
            x,
            y: Some(y),
            trace_type: ChartType::Bar,
            mode: None,
            marker: Marker {
                color: settings.palette.bar.clone(),
                opacity: None,
            },
        }],
        layout: AxisLayout::titled(column.name(), "Count"),
        grid_pos: None,
    }
}

fn distribution_histogram(column: &Column, settings: &EngineSettings) -> ChartSpec {
    let x = column.numeric_values().map(AxisValue::Number).collect();
    ChartSpec {
        id: HISTOGRAM_CHART_ID.to_string(),
        chart_type: ChartType::Histogram,
        title: format!("Distribution of {}", column.name()),
        data: vec![Series {
            x,
            y: None,
            trace_type: ChartType::Histogram,
            mode: None,
            marker: Marker {
                color: settings.palette.histogram.clone(),
                opacity: None,
            },
        }],
        layout: AxisLayout::titled(column.name(), "Frequency"),
        grid_pos: None,
    }
}
