//! Arena geometry and the queries the simulated sensors ask of it
//!
//! An [`Arena`] is a flat rectangular field with tape strips on the floor,
//! track-wire sources buried under it, one beacon, and round obstacle
//! posts. Everything is in meters with the origin at the field's
//! south-west corner. The layout loads from a JSON file so course
//! variations do not need a rebuild.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Point or offset in field coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Straight tape strip on the floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapeStrip {
    pub from: Vec2,
    pub to: Vec2,
    /// Full strip width (meters)
    pub width: f32,
}

/// Track-wire emitter under the floor, detectable within `radius`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireSource {
    pub at: Vec2,
    pub radius: f32,
}

/// The target beacon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beacon {
    pub at: Vec2,
    /// Detection range (meters); the detector's field of view comes from
    /// the rover config, not the arena.
    pub range: f32,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn enabled_default() -> bool {
    true
}

/// Round post the rover can bump into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub at: Vec2,
    pub radius: f32,
}

/// A complete course layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Field extent along x (meters)
    pub width: f32,
    /// Field extent along y (meters)
    pub height: f32,
    #[serde(default)]
    pub tape: Vec<TapeStrip>,
    #[serde(default)]
    pub wires: Vec<WireSource>,
    pub beacon: Beacon,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl Arena {
    /// Load and validate an arena from a JSON file.
    pub fn load(path: &str) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let arena: Arena = serde_json::from_str(&text)?;
        arena.validate()?;
        Ok(arena)
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SimError::Arena(format!(
                "field must have positive extent, got {} x {}",
                self.width, self.height
            )));
        }
        if let Some(strip) = self.tape.iter().find(|s| s.width <= 0.0) {
            return Err(SimError::Arena(format!(
                "tape strip at ({}, {}) has non-positive width",
                strip.from.x, strip.from.y
            )));
        }
        if let Some(wire) = self.wires.iter().find(|w| w.radius <= 0.0) {
            return Err(SimError::Arena(format!(
                "wire source at ({}, {}) has non-positive radius",
                wire.at.x, wire.at.y
            )));
        }
        if let Some(post) = self.obstacles.iter().find(|o| o.radius <= 0.0) {
            return Err(SimError::Arena(format!(
                "obstacle at ({}, {}) has non-positive radius",
                post.at.x, post.at.y
            )));
        }
        Ok(())
    }

    /// Is this point on tape?
    pub fn tape_at(&self, p: Vec2) -> bool {
        self.tape
            .iter()
            .any(|s| segment_distance(p, s.from, s.to) <= s.width / 2.0)
    }

    /// Is this point within range of any track-wire source?
    pub fn wire_at(&self, p: Vec2) -> bool {
        self.wires.iter().any(|w| p.distance(w.at) <= w.radius)
    }

    /// Would a bumper at this point be pressed?
    ///
    /// Contact happens against obstacle posts and against the field walls.
    pub fn obstacle_contact(&self, p: Vec2) -> bool {
        if p.x <= 0.0 || p.y <= 0.0 || p.x >= self.width || p.y >= self.height {
            return true;
        }
        self.obstacles.iter().any(|o| p.distance(o.at) <= o.radius)
    }
}

impl Default for Arena {
    /// A practice course: loading station along the west wall, target
    /// line and beacon in the north-east corner, one post mid-field.
    fn default() -> Self {
        Self {
            width: 2.4,
            height: 2.4,
            tape: vec![
                // Lead-in strip toward the loading station
                TapeStrip {
                    from: Vec2::new(0.3, 1.2),
                    to: Vec2::new(0.3, 2.1),
                    width: 0.05,
                },
                // Target line in front of the beacon
                TapeStrip {
                    from: Vec2::new(1.7, 2.0),
                    to: Vec2::new(2.3, 2.0),
                    width: 0.05,
                },
            ],
            wires: vec![WireSource {
                at: Vec2::new(0.3, 2.1),
                radius: 0.25,
            }],
            beacon: Beacon {
                at: Vec2::new(2.0, 2.0),
                range: 3.0,
                enabled: true,
            },
            obstacles: vec![Obstacle {
                at: Vec2::new(1.2, 1.2),
                radius: 0.1,
            }],
        }
    }
}

/// Distance from `p` to the segment `a..b`.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Vec2::new(a.x + t * abx, a.y + t * aby))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tape_strip_hit_and_miss() {
        let arena = Arena::default();
        // On the station lead-in, slightly off its centerline
        assert!(arena.tape_at(Vec2::new(0.31, 1.5)));
        // Past the strip end cap
        assert!(!arena.tape_at(Vec2::new(0.3, 1.0)));
        // Beside the strip, beyond half its width
        assert!(!arena.tape_at(Vec2::new(0.4, 1.5)));
    }

    #[test]
    fn test_wire_detection_radius() {
        let arena = Arena::default();
        assert!(arena.wire_at(Vec2::new(0.3, 2.0)));
        assert!(!arena.wire_at(Vec2::new(0.3, 1.5)));
    }

    #[test]
    fn test_walls_and_posts_make_contact() {
        let arena = Arena::default();
        assert!(arena.obstacle_contact(Vec2::new(-0.01, 1.0)));
        assert!(arena.obstacle_contact(Vec2::new(1.0, 2.5)));
        assert!(arena.obstacle_contact(Vec2::new(1.25, 1.2)));
        assert!(!arena.obstacle_contact(Vec2::new(0.6, 0.6)));
    }

    #[test]
    fn test_parse_minimal_json() {
        let arena: Arena = serde_json::from_str(
            r#"{
                "width": 1.0,
                "height": 1.0,
                "beacon": { "at": { "x": 0.5, "y": 0.5 }, "range": 2.0 }
            }"#,
        )
        .unwrap();
        assert!(arena.beacon.enabled);
        assert!(arena.tape.is_empty());
        assert!(arena.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_flat_field() {
        let mut arena = Arena::default();
        arena.height = 0.0;
        assert!(matches!(arena.validate(), Err(SimError::Arena(_))));
    }
}
