//! Serpentine perimeter-stack generation.
//!
//! Each zone is a stack of perimeters traced with the edge template
//! right, up, left, up. The last "up" of one perimeter runs straight into
//! the "right" of the next, so the stack is one continuous serpentine.
//! Between zones the path bridges along the top of the stack into the
//! gutter, travels down without extruding, and the next zone's first edge
//! runs from the gutter to its own right side.
//!
//! In [`ExtrusionMode::ReferenceCompatible`] the travel prints the held
//! value but the counter is still advanced by one template edge, so later
//! zones start from a slightly larger E.

use nalgebra::Point3;
use rheopath_flow::FlowState;
use tracing::debug;

use crate::extrusion::ExtrusionAccumulator;
use crate::params::{ExtrusionMode, LatticeSettings, Zone};
use crate::path::{Move, MoveKind, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Right,
    Up,
    Left,
}

const PERIMETER_TEMPLATE: [Edge; 4] = [Edge::Right, Edge::Up, Edge::Left, Edge::Up];

/// Generate the full move sequence for `zones`.
///
/// Cannot fail: every coordinate and extrusion value is an algebraic
/// function of already-validated scalars.
pub fn generate(
    zones: &[Zone],
    deltax: f64,
    deltay: f64,
    settings: &LatticeSettings,
    flow: &FlowState,
) -> Path {
    let Some(first) = zones.first() else {
        return Path::default();
    };

    let layers = &settings.layers;
    let base_z = layers.height_at(0);
    let edge_total: usize = zones.iter().map(|z| z.perimeters as usize * 4).sum();
    let mut moves = Vec::with_capacity(edge_total + 2 * zones.len());
    let mut extruder = ExtrusionAccumulator::new(*flow, settings.calibration);

    moves.push(Move {
        position: Point3::new(first.origin.x, first.origin.y, base_z),
        extrusion: extruder.hold(),
        feed_rate: first.feed_rate,
        kind: MoveKind::Start,
        zone: 0,
    });

    for (index, zone) in zones.iter().enumerate() {
        let left = zone.origin.x;
        let right = left + deltax;
        let feed_rate = zone.feed_rate;

        let mut x = left;
        let mut rises = 0u32;
        let mut z = base_z;
        let mut edge_index = 0usize;

        for _ in 0..zone.perimeters {
            for edge in PERIMETER_TEMPLATE {
                let delta = match edge {
                    Edge::Right => {
                        x = right;
                        deltax
                    }
                    Edge::Left => {
                        x = left;
                        deltax
                    }
                    Edge::Up => {
                        rises += 1;
                        deltay
                    }
                };
                z = layers.height_at(edge_index);
                moves.push(Move {
                    position: Point3::new(x, zone.origin.y + f64::from(rises) * deltay, z),
                    extrusion: extruder.advance(delta, feed_rate),
                    feed_rate,
                    kind: MoveKind::Perimeter,
                    zone: index,
                });
                edge_index += 1;
            }
        }

        let top = zone.origin.y + f64::from(rises) * deltay;

        match zones.get(index + 1) {
            Some(next) => {
                let gutter_x = (right + next.origin.x) / 2.0;
                moves.push(Move {
                    position: Point3::new(gutter_x, top, z),
                    extrusion: extruder.advance(deltax, feed_rate),
                    feed_rate,
                    kind: MoveKind::Bridge,
                    zone: index,
                });
                moves.push(Move {
                    position: Point3::new(gutter_x, next.origin.y, base_z),
                    extrusion: extruder.hold(),
                    feed_rate,
                    kind: MoveKind::Travel,
                    zone: index,
                });
                if settings.extrusion_mode == ExtrusionMode::ReferenceCompatible {
                    // Counter advances behind the held travel value.
                    let hidden = if index % 2 == 0 { deltay } else { deltax };
                    extruder.advance(hidden, feed_rate);
                }
            }
            None => {
                let extrusion = match settings.extrusion_mode {
                    ExtrusionMode::ReferenceCompatible => extruder.hold(),
                    ExtrusionMode::Strict => extruder.advance(deltax, feed_rate),
                };
                moves.push(Move {
                    position: Point3::new(right, top, settings.park_height),
                    extrusion,
                    feed_rate,
                    kind: MoveKind::Park,
                    zone: index,
                });
            }
        }

        debug!(
            zone = index,
            feed_rate,
            perimeters = zone.perimeters,
            extrusion = extruder.hold(),
            "Generated zone"
        );
    }

    Path::new(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::extrusion_increment;
    use crate::params::{LayerSchedule, ProcessParameters};
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use rheopath_flow::PowerLaw;

    fn reference_flow() -> FlowState {
        FlowState::derive(&PowerLaw::new(1.0), 50.0, 0.4).unwrap()
    }

    fn reference_path(feed_rates: Vec<f64>, settings: &LatticeSettings) -> Path {
        let params = ProcessParameters {
            feed_rates,
            ..Default::default()
        };
        let zones = params.reference_zones(settings);
        generate(&zones, params.deltax, params.deltay, settings, &reference_flow())
    }

    #[test]
    fn test_reference_move_count() {
        let path = reference_path(vec![600.0; 3], &LatticeSettings::default());
        // start + 3 * 28 edges + 2 * (bridge + travel) + park
        assert_eq!(path.len(), 90);
        assert_eq!(path.moves[0].kind, MoveKind::Start);
        assert_eq!(path.moves[89].kind, MoveKind::Park);
    }

    #[test]
    fn test_first_zone_geometry() {
        let path = reference_path(vec![600.0; 3], &LatticeSettings::default());
        let xy = path.projection();
        assert_eq!(xy[0], Point2::new(0.0, 0.0));
        assert_eq!(xy[1], Point2::new(5.0, 0.0));
        assert_eq!(xy[2], Point2::new(5.0, 5.0));
        assert_eq!(xy[3], Point2::new(0.0, 5.0));
        assert_eq!(xy[4], Point2::new(0.0, 10.0));
        assert_eq!(xy[28], Point2::new(0.0, 70.0));
        // Bridge into the gutter, then back down.
        assert_eq!(xy[29], Point2::new(15.0, 70.0));
        assert_eq!(xy[30], Point2::new(15.0, 0.0));
        // Second zone enters at its lower-right corner.
        assert_eq!(xy[31], Point2::new(30.0, 0.0));
        assert_eq!(xy[32], Point2::new(30.0, 5.0));
        assert_eq!(xy[33], Point2::new(25.0, 5.0));
    }

    #[test]
    fn test_z_tiers() {
        let path = reference_path(vec![600.0; 3], &LatticeSettings::default());
        let z: Vec<f64> = path.iter().map(|m| m.position.z).collect();
        assert!(z[0..=8].iter().all(|&h| h == 0.0));
        assert!(z[9..=18].iter().all(|&h| h == 2.0));
        assert!(z[19..=29].iter().all(|&h| h == 4.0));
        assert_eq!(z[30], 0.0);
        assert_eq!(z[89], 30.0);
    }

    #[test]
    fn test_first_extruding_move() {
        let path = reference_path(vec![600.0; 3], &LatticeSettings::default());
        assert_eq!(path.moves[0].extrusion, 0.0);
        assert_relative_eq!(path.moves[1].extrusion, 0.020_263_272_6, epsilon = 1e-9);
    }

    #[test]
    fn test_extrusion_non_decreasing() {
        let path = reference_path(vec![600.0, 900.0, 1500.0], &LatticeSettings::default());
        assert!(path.is_extrusion_monotonic());
        for w in path.moves.windows(2) {
            if matches!(w[1].kind, MoveKind::Perimeter | MoveKind::Bridge) {
                assert!(w[1].extrusion > w[0].extrusion);
            }
        }
    }

    #[test]
    fn test_increment_within_tier_matches_formula() {
        let flow = reference_flow();
        let settings = LatticeSettings::default();
        let params = ProcessParameters {
            deltax: 5.0,
            deltay: 3.0,
            feed_rates: vec![450.0, 700.0, 1200.0],
            ..Default::default()
        };
        let zones = params.reference_zones(&settings);
        let path = generate(&zones, params.deltax, params.deltay, &settings, &flow);

        for w in path.moves.windows(2) {
            let (prev, next) = (&w[0], &w[1]);
            if prev.zone != next.zone
                || prev.position.z != next.position.z
                || next.kind == MoveKind::Travel
            {
                continue;
            }
            let horizontal = next.position.y == prev.position.y;
            let delta = if horizontal { params.deltax } else { params.deltay };
            let expected = extrusion_increment(delta, next.feed_rate, &flow, settings.calibration);
            assert_relative_eq!(next.extrusion - prev.extrusion, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_travel_holds_extrusion() {
        let path = reference_path(vec![600.0; 3], &LatticeSettings::default());
        let travels: Vec<usize> = path
            .iter()
            .enumerate()
            .filter(|(_, m)| m.kind == MoveKind::Travel)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(travels, vec![30, 60]);
        for i in travels {
            assert_eq!(path.moves[i].extrusion, path.moves[i - 1].extrusion);
        }
    }

    #[test]
    fn test_feed_rate_follows_owning_zone() {
        let feeds = vec![450.0, 700.0, 1200.0];
        let path = reference_path(feeds.clone(), &LatticeSettings::default());
        for m in &path {
            assert_eq!(m.feed_rate, feeds[m.zone]);
        }
    }

    #[test]
    fn test_park_move_modes() {
        let reference = reference_path(vec![600.0; 3], &LatticeSettings::default());
        let last = &reference.moves[89];
        assert_eq!(last.extrusion, reference.moves[88].extrusion);
        assert_eq!(last.position, Point3::new(55.0, 70.0, 30.0));

        let strict_settings = LatticeSettings {
            extrusion_mode: ExtrusionMode::Strict,
            ..Default::default()
        };
        let strict = reference_path(vec![600.0; 3], &strict_settings);
        let expected = strict.moves[88].extrusion
            + extrusion_increment(5.0, 600.0, &reference_flow(), strict_settings.calibration);
        assert_relative_eq!(strict.moves[89].extrusion, expected, epsilon = 1e-12);
        // Identical up to the first travel, then strict lags behind.
        assert_eq!(&strict.moves[..31], &reference.moves[..31]);
        assert!(strict.moves[31].extrusion < reference.moves[31].extrusion);
        assert!(strict.is_extrusion_monotonic());
    }

    #[test]
    fn test_hidden_advance_at_zone_change() {
        let flow = reference_flow();
        let settings = LatticeSettings::default();
        let params = ProcessParameters {
            deltax: 5.0,
            deltay: 3.0,
            feed_rates: vec![600.0, 900.0, 1500.0],
            ..Default::default()
        };
        let zones = params.reference_zones(&settings);
        let path = generate(&zones, params.deltax, params.deltay, &settings, &flow);
        let k = settings.calibration;

        // First change: deltay at the departing feed, then the entry edge.
        let jump = path.moves[31].extrusion - path.moves[30].extrusion;
        let expected = extrusion_increment(3.0, 600.0, &flow, k)
            + extrusion_increment(5.0, 900.0, &flow, k);
        assert_relative_eq!(jump, expected, epsilon = 1e-12);

        // Second change: deltax.
        let jump = path.moves[61].extrusion - path.moves[60].extrusion;
        let expected = extrusion_increment(5.0, 900.0, &flow, k)
            + extrusion_increment(5.0, 1500.0, &flow, k);
        assert_relative_eq!(jump, expected, epsilon = 1e-12);

        // The travel itself still holds.
        assert_eq!(path.moves[30].extrusion, path.moves[29].extrusion);
        assert!(path.is_extrusion_monotonic());
    }

    #[test]
    fn test_single_zone_is_prefix_of_three() {
        let settings = LatticeSettings::default();
        let one = reference_path(vec![600.0], &settings);
        let three = reference_path(vec![600.0, 800.0, 1000.0], &settings);

        let owned = |path: &Path| -> Vec<Move> {
            path.zone_moves(0)
                .filter(|m| matches!(m.kind, MoveKind::Start | MoveKind::Perimeter))
                .cloned()
                .collect()
        };
        assert_eq!(owned(&one).len(), 29);
        assert_eq!(owned(&one), owned(&three));
    }

    #[test]
    fn test_custom_zone_list() {
        let zones = vec![
            Zone {
                origin: Point2::new(10.0, 10.0),
                feed_rate: 300.0,
                perimeters: 2,
            },
            Zone {
                origin: Point2::new(30.0, 20.0),
                feed_rate: 600.0,
                perimeters: 1,
            },
        ];
        let settings = LatticeSettings {
            layers: LayerSchedule::uniform(4, 0.5, 4),
            ..Default::default()
        };
        let path = generate(&zones, 4.0, 2.0, &settings, &reference_flow());

        // start + 8 + bridge + travel + 4 + park
        assert_eq!(path.len(), 16);
        assert_eq!(path.moves[8].position, Point3::new(10.0, 18.0, 0.5));
        assert_eq!(path.moves[9].position, Point3::new(22.0, 18.0, 0.5));
        assert_eq!(path.moves[10].position, Point3::new(22.0, 20.0, 0.0));
        assert_eq!(path.moves[11].position, Point3::new(34.0, 20.0, 0.0));
        assert_eq!(path.moves[15].position, Point3::new(34.0, 24.0, 30.0));
        assert!(path.is_extrusion_monotonic());
    }

    #[test]
    fn test_empty_zone_list() {
        let path = generate(&[], 5.0, 5.0, &LatticeSettings::default(), &reference_flow());
        assert!(path.is_empty());
    }

    #[test]
    fn test_repeatable() {
        let settings = LatticeSettings::default();
        let a = reference_path(vec![600.0, 750.0], &settings);
        let b = reference_path(vec![600.0, 750.0], &settings);
        assert_eq!(a, b);
    }
}
