use std::collections::HashMap;

use crate::table::Column;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Counts distinct values while remembering the order in which each value was
/// first seen, so ties can be resolved by appearance.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    positions: HashMap<String, usize>,
    counts: Vec<CategoryCount>,
}

impl FrequencyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest(&mut self, value: &str) {
        match self.positions.get(value) {
            Some(&idx) => self.counts[idx].count += 1,
            None => {
                self.positions.insert(value.to_string(), self.counts.len());
                self.counts.push(CategoryCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Most frequent values, counts descending, ties in first-seen order.
    /// `top == 0` keeps every value.
    pub fn top(mut self, top: usize) -> Vec<CategoryCount> {
        // stable sort keeps first-seen order among equal counts
        self.counts.sort_by(|a, b| b.count.cmp(&a.count));
        if top > 0 && self.counts.len() > top {
            self.counts.truncate(top);
        }
        self.counts
    }
}

pub fn top_categories(column: &Column, top: usize) -> Vec<CategoryCount> {
    let mut accumulator = FrequencyAccumulator::new();
    for value in column.text_values() {
        accumulator.ingest(value);
    }
    accumulator.top(top)
}
