//! Toolpath types and statistics.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Role of a move in the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    /// First move of the path, positioning at the first zone's origin.
    Start,
    /// Edge of a stacked perimeter.
    Perimeter,
    /// Extruding move along the top of a finished stack into the gutter.
    Bridge,
    /// Non-extruding reposition to the next zone's base.
    Travel,
    /// Final lift to the park height.
    Park,
}

/// One linear toolpath step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Target position (mm).
    pub position: Point3<f64>,
    /// Cumulative extrusion length after this move.
    pub extrusion: f64,
    /// Feed rate in force for this move (mm/min).
    pub feed_rate: f64,
    /// Role of the move.
    pub kind: MoveKind,
    /// Index of the owning zone.
    pub zone: usize,
}

impl Move {
    /// Planar projection of the target position.
    pub fn xy(&self) -> Point2<f64> {
        self.position.xy()
    }
}

/// Ordered sequence of moves across all zones and layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Moves in generation order.
    pub moves: Vec<Move>,
}

impl Path {
    /// Create a path from moves.
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Iterate over the moves.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// The (x, y) of every move, in order. Used for rendering.
    pub fn projection(&self) -> Vec<Point2<f64>> {
        self.moves.iter().map(Move::xy).collect()
    }

    /// Extrusion value of the last move.
    pub fn total_extrusion(&self) -> f64 {
        self.moves.last().map_or(0.0, |m| m.extrusion)
    }

    /// Moves owned by one zone.
    pub fn zone_moves(&self, zone: usize) -> impl Iterator<Item = &Move> {
        self.moves.iter().filter(move |m| m.zone == zone)
    }

    /// Whether the extrusion value never decreases along the path.
    pub fn is_extrusion_monotonic(&self) -> bool {
        self.moves
            .windows(2)
            .all(|w| w[1].extrusion >= w[0].extrusion)
    }

    /// Compute statistics for the path.
    pub fn stats(&self) -> PathStats {
        let mut stats = PathStats {
            move_count: self.moves.len(),
            zone_count: self.moves.last().map_or(0, |m| m.zone + 1),
            total_extrusion: self.total_extrusion(),
            ..Default::default()
        };

        let Some(first) = self.moves.first() else {
            return stats;
        };

        let mut min = first.position;
        let mut max = first.position;
        for m in &self.moves {
            min = min.inf(&m.position);
            max = max.sup(&m.position);
        }
        stats.bounds_min = [min.x, min.y, min.z];
        stats.bounds_max = [max.x, max.y, max.z];

        for w in self.moves.windows(2) {
            let (prev, next) = (&w[0], &w[1]);
            let planar = (next.xy() - prev.xy()).norm();
            let spatial = (next.position - prev.position).norm();

            if next.extrusion > prev.extrusion {
                stats.extruding_moves += 1;
                stats.extrusion_path_mm += planar;
            } else {
                stats.travel_moves += 1;
                stats.travel_mm += planar;
            }
            if next.feed_rate > 0.0 {
                stats.motion_time_minutes += spatial / next.feed_rate;
            }
        }

        stats
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Statistics about a generated path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathStats {
    /// Total number of moves.
    pub move_count: usize,
    /// Number of zones the path visits.
    pub zone_count: usize,
    /// Moves that advance extrusion.
    pub extruding_moves: usize,
    /// Moves that hold extrusion (start excluded).
    pub travel_moves: usize,
    /// Final cumulative extrusion length.
    pub total_extrusion: f64,
    /// Planar length of extruding moves (mm).
    pub extrusion_path_mm: f64,
    /// Planar length of non-extruding moves (mm).
    pub travel_mm: f64,
    /// Estimated motion time at the programmed feed rates (min).
    pub motion_time_minutes: f64,
    /// Bounding box min corner.
    pub bounds_min: [f64; 3],
    /// Bounding box max corner.
    pub bounds_max: [f64; 3],
}
