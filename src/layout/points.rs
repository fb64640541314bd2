//! Sub-cell placement of question markers
//!
//! Every intersection has a `size × size` slot grid. Questions take the first
//! free slot in row-major order; once the grid is full, further questions get
//! a pseudo-random spot in the inner 80% of the cell. The generator is seeded
//! from the config, so identical input always yields identical output.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::model::{CompetencyQuestion, IntersectionKey};

use super::config::LayoutConfig;
use super::types::{BoundingBox, Point, SubCellPosition};

/// Assign a normalized position to every question, keyed by question id
///
/// Irrelevant questions are skipped. Bookkeeping of occupied slots lives only
/// for the duration of this call.
pub fn place_points<'a, I>(questions: I, config: &LayoutConfig) -> HashMap<String, SubCellPosition>
where
    I: IntoIterator<Item = &'a CompetencyQuestion>,
{
    let size = config.point_grid_size.max(1);
    let mut occupied: HashMap<IntersectionKey<'a>, HashSet<(usize, usize)>> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(config.fallback_seed);
    let mut positions = HashMap::new();
    let mut overflow = 0usize;

    for cq in questions.into_iter().filter(|cq| cq.is_relevant) {
        let taken = occupied.entry(cq.intersection()).or_default();
        let position = match first_free_slot(taken, size) {
            Some((i, j)) => {
                taken.insert((i, j));
                slot_position(i, j, size)
            }
            None => {
                overflow += 1;
                SubCellPosition {
                    x: rng.gen_range(0.1..0.9),
                    y: rng.gen_range(0.1..0.9),
                    grid_x: -1,
                    grid_y: -1,
                }
            }
        };
        positions.insert(cq.id.clone(), position);
    }

    if overflow > 0 {
        debug!(overflow, "slot grids exhausted, used fallback positions");
    }
    positions
}

fn first_free_slot(taken: &HashSet<(usize, usize)>, size: usize) -> Option<(usize, usize)> {
    (0..size)
        .flat_map(|i| (0..size).map(move |j| (i, j)))
        .find(|slot| !taken.contains(slot))
}

/// Normalized center of slot (i, j)
pub fn slot_position(i: usize, j: usize, size: usize) -> SubCellPosition {
    let size_f = size as f64;
    SubCellPosition {
        x: (i as f64 + 0.5) / size_f,
        y: (j as f64 + 0.5) / size_f,
        grid_x: i as i32,
        grid_y: j as i32,
    }
}

/// Project a normalized position into a cell, inset by `margin`
pub fn project(position: &SubCellPosition, cell: &BoundingBox, margin: f64) -> Point {
    let span_x = (cell.width - 2.0 * margin).max(0.0);
    let span_y = (cell.height - 2.0 * margin).max(0.0);
    let inset_x = margin.min(cell.width / 2.0);
    let inset_y = margin.min(cell.height / 2.0);
    Point::new(
        cell.x + inset_x + position.x * span_x,
        cell.y + inset_y + position.y * span_y,
    )
}
