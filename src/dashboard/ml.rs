use log::debug;

use super::{AxisLayout, AxisValue, ChartSpec, ChartType, Kpi, Marker, Panels, Series};
use crate::{
    config::EngineSettings,
    table::{Column, ColumnType, Table},
};

pub(crate) const SCATTER_CHART_ID: &str = "ml-scatter";

pub(crate) fn build(table: &Table, settings: &EngineSettings) -> Panels {
    let kpis = vec![
        Kpi::count("Dataset Size", table.row_count()),
        Kpi::count("Features", table.column_count()),
    ];

    // Only the first two numeric columns are ever paired.
    let mut numeric = table.columns_of(ColumnType::Numeric);
    let charts = match (numeric.next(), numeric.next()) {
        (Some(x_column), Some(y_column)) => {
            vec![paired_scatter(table, x_column, y_column, settings)]
        }
        _ => {
            debug!("Fewer than two numeric columns; scatter plot omitted");
            Vec::new()
        }
    };

    Panels { kpis, charts }
}

fn paired_scatter(
    table: &Table,
    x_column: &Column,
    y_column: &Column,
    settings: &EngineSettings,
) -> ChartSpec {
    let (x, y): (Vec<_>, Vec<_>) = (0..table.row_count())
        .filter_map(|row| Some((x_column.number_at(row)?, y_column.number_at(row)?)))
        .map(|(x, y)| (AxisValue::Number(x), AxisValue::Number(y)))
        .unzip();
    ChartSpec {
        id: SCATTER_CHART_ID.to_string(),
        chart_type: ChartType::Scatter,
        title: format!("Correlation: {} vs {}", x_column.name(), y_column.name()),
        data: vec![Series {
            x,
            y: Some(y),
            trace_type: ChartType::Scatter,
            mode: Some("markers".to_string()),
            marker: Marker {
                color: settings.palette.scatter.clone(),
                opacity: Some(settings.palette.scatter_opacity),
            },
        }],
        layout: AxisLayout::titled(x_column.name(), y_column.name()),
        grid_pos: None,
    }
}
