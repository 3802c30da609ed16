//! CSV ingestion and column type inference.
//!
//! [`Table`] is the column-oriented representation every other module reads
//! from. It is built once per request from raw bytes and never mutated.
//!
//! ## Ingestion rules
//!
//! - The first record is the header. Blank names become `column_{n}` and
//!   repeated names are suffixed `_2`, `_3`, … in header order.
//! - Records whose field count differs from the header, or whose bytes are not
//!   valid in the requested encoding, are skipped and counted.
//! - Cells are trimmed; empty cells and configured missing tokens are
//!   [`Cell::Missing`].
//! - A column is [`ColumnType::Numeric`] only when every non-missing cell is a
//!   finite `f64`; one stray token demotes it to [`ColumnType::Text`]. A column
//!   with no values at all is [`ColumnType::Unknown`].

use std::{collections::HashSet, fmt};

use encoding_rs::{Encoding, UTF_8};
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{config::EngineSettings, error::ParseError, io_utils};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Text,
    Unknown,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_display(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Number(value) => Some(format_number(*value)),
            Cell::Text(value) => Some(value.clone()),
        }
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    column_type: ColumnType,
    cells: Vec<Cell>,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }

    /// Non-missing numbers in row order. Empty for non-numeric columns.
    pub fn numeric_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Number(value) => Some(*value),
            _ => None,
        })
    }

    /// Non-missing strings in row order. Empty for non-text columns.
    pub fn text_values(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.iter().filter_map(|cell| match cell {
            Cell::Text(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn number_at(&self, row: usize) -> Option<f64> {
        match self.cells.get(row) {
            Some(Cell::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_missing()).count()
    }

    pub fn present_count(&self) -> usize {
        self.cells.len() - self.missing_count()
    }
}

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    pub missing_tokens: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            encoding: UTF_8,
            missing_tokens: Vec::new(),
        }
    }
}

impl ReadOptions {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            missing_tokens: settings.missing_tokens.clone(),
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn is_missing(&self, trimmed: &str) -> bool {
        trimmed.is_empty() || self.missing_tokens.iter().any(|token| token == trimmed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
    skipped_rows: usize,
}

impl Table {
    pub fn from_csv_str(input: &str) -> Result<Self, ParseError> {
        Self::from_csv_bytes(input.as_bytes(), &ReadOptions::default())
    }

    pub fn from_csv_bytes(bytes: &[u8], options: &ReadOptions) -> Result<Self, ParseError> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::Empty);
        }

        let mut reader = io_utils::open_csv_reader(bytes, options.delimiter);
        let header_record = reader.byte_headers().map_err(ParseError::Header)?.clone();
        if header_record.is_empty() {
            return Err(ParseError::NoColumns);
        }
        let headers = disambiguate_headers(io_utils::decode_headers(
            &header_record,
            options.encoding,
        )?);

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut skipped = 0usize;
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!("Skipping row {}: {err}", row_idx + 2);
                    skipped += 1;
                    continue;
                }
            };
            if record.len() != headers.len() {
                debug!(
                    "Skipping row {}: expected {} field(s), found {}",
                    row_idx + 2,
                    headers.len(),
                    record.len()
                );
                skipped += 1;
                continue;
            }
            let Some(decoded) = io_utils::decode_record(&record, options.encoding) else {
                debug!(
                    "Skipping row {}: not valid {}",
                    row_idx + 2,
                    options.encoding.name()
                );
                skipped += 1;
                continue;
            };
            for (values, field) in raw.iter_mut().zip(decoded) {
                let trimmed = field.trim();
                values.push((!options.is_missing(trimmed)).then(|| trimmed.to_string()));
            }
        }

        let row_count = raw.first().map_or(0, Vec::len);
        if row_count == 0 {
            return Err(ParseError::NoRows { skipped });
        }
        if skipped > 0 {
            debug!("Skipped {skipped} malformed row(s) while reading {row_count} row(s)");
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| build_column(name, values))
            .collect::<Vec<_>>();
        debug!(
            "Inferred column types: {}",
            columns
                .iter()
                .map(|column| format!("{}={}", column.name, column.column_type))
                .join(", ")
        );

        Ok(Self {
            columns,
            row_count,
            skipped_rows: skipped,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Columns of `column_type`, in header order.
    pub fn columns_of(&self, column_type: ColumnType) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(move |column| column.column_type == column_type)
    }

    /// First column of `column_type` in header order.
    pub fn first_column_of(&self, column_type: ColumnType) -> Option<&Column> {
        self.columns_of(column_type).next()
    }
}

fn build_column(name: String, values: Vec<Option<String>>) -> Column {
    let mut present = values.iter().flatten().peekable();
    let column_type = if present.peek().is_none() {
        ColumnType::Unknown
    } else if present.all(|value| parse_finite(value).is_some()) {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    };

    let cells = values
        .into_iter()
        .map(|value| match (value, column_type) {
            (None, _) => Cell::Missing,
            (Some(raw), ColumnType::Numeric) => {
                parse_finite(&raw).map_or(Cell::Missing, Cell::Number)
            }
            (Some(raw), _) => Cell::Text(raw),
        })
        .collect();

    Column {
        name,
        column_type,
        cells,
    }
}

pub fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

pub fn disambiguate_headers(raw: Vec<String>) -> Vec<String> {
    let named = raw
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let trimmed = header.trim();
            if trimmed.is_empty() {
                format!("column_{}", idx + 1)
            } else {
                trimmed.to_string()
            }
        })
        .collect::<Vec<_>>();
    let reserved = named.iter().cloned().collect::<HashSet<_>>();

    let mut used = HashSet::with_capacity(named.len());
    let mut resolved = Vec::with_capacity(named.len());
    for name in named {
        if used.insert(name.clone()) {
            resolved.push(name);
            continue;
        }
        let mut suffix = 2usize;
        let candidate = loop {
            let candidate = format!("{name}_{suffix}");
            if !reserved.contains(&candidate) && !used.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        used.insert(candidate.clone());
        resolved.push(candidate);
    }
    resolved
}
