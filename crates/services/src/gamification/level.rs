use serde::Serialize;

use crate::catalog::Catalog;

/// Level derived from cumulative points against the catalog's ascending
/// threshold table. Levels are 1-based: level N corresponds to table row
/// N-1.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LevelInfo {
    pub level: u32,
    pub title: String,
    pub points_for_current: i64,
    /// `None` at the top level.
    pub points_for_next: Option<i64>,
    /// Fraction of the way from the current threshold to the next; 1.0 at
    /// the top level.
    pub progress: f64,
}

/// Pure: no side effects. The catalog guarantees a non-empty ascending
/// table, so the fold below always lands on a row.
pub fn level_for(catalog: &Catalog, points: i64) -> LevelInfo {
    let mut index = 0;
    for (i, row) in catalog.levels.iter().enumerate() {
        if points >= row.threshold {
            index = i;
        } else {
            break;
        }
    }

    let current = &catalog.levels[index];
    let next = catalog.levels.get(index + 1);

    let progress = match next {
        Some(next_row) => {
            let span = (next_row.threshold - current.threshold) as f64;
            ((points - current.threshold) as f64 / span).clamp(0.0, 1.0)
        }
        None => 1.0,
    };

    LevelInfo {
        level: (index + 1) as u32,
        title: current.title.to_string(),
        points_for_current: current.threshold,
        points_for_next: next.map(|n| n.threshold),
        progress,
    }
}
