use log::debug;

use super::{GridPos, Panels, simple};
use crate::{config::EngineSettings, table::Table};

pub const GRID_COLUMNS: u32 = 12;
const PANEL_HEIGHT: u32 = 4;

/// Grid slot for the chart at `index`: the first two charts split the top row
/// of a 12-unit grid. Later charts have no assigned slot.
pub fn grid_position(index: usize) -> Option<GridPos> {
    let half = GRID_COLUMNS / 2;
    match index {
        0 => Some(GridPos {
            x: 0,
            y: 0,
            w: half,
            h: PANEL_HEIGHT,
        }),
        1 => Some(GridPos {
            x: half,
            y: 0,
            w: half,
            h: PANEL_HEIGHT,
        }),
        _ => None,
    }
}

pub(crate) fn build(table: &Table, settings: &EngineSettings) -> Panels {
    let mut panels = simple::build(table, settings);
    for (index, chart) in panels.charts.iter_mut().enumerate() {
        chart.grid_pos = grid_position(index);
        if chart.grid_pos.is_none() {
            debug!("Chart '{}' left without a grid slot", chart.id);
        }
    }
    panels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_two_slots_split_the_top_row() {
        assert_eq!(
            grid_position(0),
            Some(GridPos {
                x: 0,
                y: 0,
                w: 6,
                h: 4
            })
        );
        assert_eq!(
            grid_position(1),
            Some(GridPos {
                x: 6,
                y: 0,
                w: 6,
                h: 4
            })
        );
        assert_eq!(grid_position(2), None);
    }
}
