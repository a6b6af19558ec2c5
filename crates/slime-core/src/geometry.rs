//! Square grid coordinate system.
//!
//! This module provides the pure geometry the rule engine is built on:
//! - `Coord`: identifies a single cell, `x` to the right and `y` downward
//! - straight-line visibility (rows, columns, and diagonals)
//! - Chebyshev distance and bounded neighbor enumeration
//!
//! Nothing here knows about players or selection state, so the functions can
//! be reused for both destination search and infection search.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cell coordinate on the board.
///
/// Both axes are non-negative; [`Coord::new`] folds negative input onto its
/// absolute value so a coordinate can never point outside the first quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Coord {
    /// Column (increases going right)
    pub x: u32,
    /// Row (increases going down)
    pub y: u32,
}

impl Coord {
    /// Create a coordinate, coercing both axes to non-negative
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x: x.unsigned_abs(),
            y: y.unsigned_abs(),
        }
    }

    /// Chebyshev distance: the number of king steps between two cells
    pub fn distance_to(&self, other: &Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Whether a straight line (horizontal, vertical, or 45° diagonal)
    /// can be drawn from this cell to `other`
    pub fn in_line_with(&self, other: &Coord) -> bool {
        if self.x == other.x || self.y == other.y {
            return true;
        }
        self.x.abs_diff(other.x) == self.y.abs_diff(other.y)
    }

    /// Whether `other` lies on the square ring at exactly `radius`
    pub fn on_ring(&self, other: &Coord, radius: u32) -> bool {
        radius > 0 && self.distance_to(other) == radius
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Anything that sits on a cell of the grid.
pub trait Located {
    fn coord(&self) -> Coord;
}

impl Located for Coord {
    fn coord(&self) -> Coord {
        *self
    }
}

/// Straight-line test with absent endpoints.
///
/// Returns false if either side is missing; otherwise defers to
/// [`Coord::in_line_with`]. The relation is symmetric.
pub fn is_straight_line_from(a: Option<Coord>, b: Option<Coord>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.in_line_with(&b),
        _ => false,
    }
}

/// Chebyshev distance between two cells
pub fn chebyshev_distance(a: Coord, b: Coord) -> u32 {
    a.distance_to(&b)
}

/// All `candidates` within `max_distance` of `origin`, excluding `origin` itself.
///
/// This is the union of the square rings at radius `1..=max_distance`
/// intersected with the candidate set: an axis-aligned square of side
/// `2 * max_distance + 1` around `origin`, minus the centre. Only cells that
/// appear in `candidates` are returned, so board bounds clip the square for
/// free. Results keep candidate order and are deduplicated by coordinate.
pub fn neighbors<'a, T: Located>(
    origin: Coord,
    candidates: &'a [T],
    max_distance: u32,
) -> Vec<&'a T> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .filter(|candidate| {
            let coord = candidate.coord();
            (1..=max_distance).any(|radius| origin.on_ring(&coord, radius)) && seen.insert(coord)
        })
        .collect()
}

/// Destination candidates for a move: neighbors within two steps that can be
/// reached along one of the eight compass directions.
pub fn straight_line_neighbors<'a, T: Located>(origin: Coord, candidates: &'a [T]) -> Vec<&'a T> {
    neighbors(origin, candidates, 2)
        .into_iter()
        .filter(|candidate| origin.in_line_with(&candidate.coord()))
        .collect()
}
