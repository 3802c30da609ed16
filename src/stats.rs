use serde::{Deserialize, Serialize};

use crate::table::{Column, ColumnType, Table};

/// Per-column statistics. The numeric fields are only populated for numeric
/// columns with at least one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric && self.count > 0
    }
}

/// Single-pass accumulator using Welford's update, so the variance stays
/// stable for large magnitudes without a second pass over the values.
#[derive(Debug, Clone, Default)]
pub struct ColumnStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population standard deviation; zero for a single value.
    pub fn std_dev(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some((self.m2 / self.count as f64).max(0.0).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

impl FromIterator<f64> for ColumnStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for value in iter {
            stats.add_value(value);
        }
        stats
    }
}

/// Single-pass co-moment accumulator for Pearson correlation of paired
/// values.
#[derive(Debug, Clone, Default)]
pub struct PairStats {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    co_moment: f64,
}

impl PairStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pair(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;
        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;
        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.co_moment += dx * (y - self.mean_y);
    }

    /// Pearson's r, or `None` when either side has no variance.
    pub fn correlation(&self) -> Option<f64> {
        if self.count < 2 || self.m2_x <= 0.0 || self.m2_y <= 0.0 {
            return None;
        }
        let r = self.co_moment / (self.m2_x * self.m2_y).sqrt();
        r.is_finite().then(|| r.clamp(-1.0, 1.0))
    }
}

impl FromIterator<(f64, f64)> for PairStats {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let mut stats = Self::new();
        for (x, y) in iter {
            stats.add_pair(x, y);
        }
        stats
    }
}

/// Pearson correlation over the rows where both columns hold a number.
pub fn correlation(x: &Column, y: &Column) -> Option<f64> {
    let rows = x.cells().len().min(y.cells().len());
    (0..rows)
        .filter_map(|row| Some((x.number_at(row)?, y.number_at(row)?)))
        .collect::<PairStats>()
        .correlation()
}

pub fn summarize(table: &Table) -> Vec<ColumnSummary> {
    table.columns().iter().map(summarize_column).collect()
}

pub fn summarize_column(column: &Column) -> ColumnSummary {
    if !column.is_numeric() {
        return ColumnSummary {
            name: column.name().to_string(),
            column_type: column.column_type(),
            count: column.present_count(),
            mean: None,
            std: None,
            min: None,
            max: None,
        };
    }
    let stats = column.numeric_values().collect::<ColumnStats>();
    ColumnSummary {
        name: column.name().to_string(),
        column_type: column.column_type(),
        count: stats.count(),
        mean: stats.mean(),
        std: stats.std_dev(),
        min: stats.min(),
        max: stats.max(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
