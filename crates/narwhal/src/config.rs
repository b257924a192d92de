use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest width/height a room may take; size edits below this are clamped.
pub const MIN_ROOM_DIMENSION: f64 = 20.0;

pub const DEFAULT_ROOM_WIDTH: f64 = 120.0;
pub const DEFAULT_ROOM_HEIGHT: f64 = 80.0;

/// Solver coefficients.
///
/// The defaults were tuned together with the `dt * 60` position step in
/// [`crate::algo::Integrator`]; changing one without the others changes the feel of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParams {
    /// Pull of every room toward the origin, proportional to its position.
    pub center_k: f64,
    /// Spring stiffness between connected rooms.
    pub attract_k: f64,
    /// Inverse-square repulsion between unconnected rooms.
    pub repel_k: f64,
    /// Per-tick velocity multiplier, in `(0, 1)`.
    pub damping: f64,
    pub max_speed: f64,
    /// Gap kept between the effective radii of connected rooms.
    pub target_gap: f64,
    /// Minimum gap between the effective radii of unconnected rooms.
    pub min_gap: f64,
    /// Every room must be slower than this for the layout to count as settled.
    pub stop_vel: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            center_k: 0.002,
            attract_k: 6.0,
            repel_k: 400_000.0,
            damping: 0.85,
            max_speed: 12.0,
            target_gap: 24.0,
            min_gap: 48.0,
            stop_vel: 0.05,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("centerK", self.center_k),
            ("attractK", self.attract_k),
            ("repelK", self.repel_k),
            ("damping", self.damping),
            ("maxSpeed", self.max_speed),
            ("targetGap", self.target_gap),
            ("minGap", self.min_gap),
            ("stopVel", self.stop_vel),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidParam { name, value });
            }
        }

        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(Error::InvalidParam {
                name: "damping",
                value: self.damping,
            });
        }
        for (name, value) in [
            ("attractK", self.attract_k),
            ("repelK", self.repel_k),
            ("maxSpeed", self.max_speed),
            ("stopVel", self.stop_vel),
        ] {
            if value <= 0.0 {
                return Err(Error::InvalidParam { name, value });
            }
        }
        for (name, value) in [
            ("centerK", self.center_k),
            ("targetGap", self.target_gap),
            ("minGap", self.min_gap),
        ] {
            if value < 0.0 {
                return Err(Error::InvalidParam { name, value });
            }
        }
        Ok(())
    }
}

/// Engine-level configuration: solver coefficients plus room defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub params: SimulationParams,
    /// Base size given to a room when it first appears.
    pub room_width: f64,
    pub room_height: f64,
    /// Read-only rendering mode: the solver is never started.
    pub preview: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            params: SimulationParams::default(),
            room_width: DEFAULT_ROOM_WIDTH,
            room_height: DEFAULT_ROOM_HEIGHT,
            preview: false,
        }
    }
}

impl LayoutConfig {
    /// Parses a (possibly partial) JSON override; missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn preview() -> Self {
        Self {
            preview: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        for (name, value) in [
            ("roomWidth", self.room_width),
            ("roomHeight", self.room_height),
        ] {
            if !value.is_finite() || value < MIN_ROOM_DIMENSION {
                return Err(Error::InvalidParam { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        LayoutConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_json_merges_onto_defaults() {
        let cfg = LayoutConfig::from_json_str(r#"{ "params": { "damping": 0.5 }, "roomWidth": 200 }"#)
            .expect("config");
        assert_eq!(cfg.params.damping, 0.5);
        assert_eq!(cfg.params.attract_k, SimulationParams::default().attract_k);
        assert_eq!(cfg.room_width, 200.0);
        assert_eq!(cfg.room_height, DEFAULT_ROOM_HEIGHT);
        assert!(!cfg.preview);
    }

    #[test]
    fn damping_must_stay_inside_the_unit_interval() {
        for damping in [0.0, 1.0, 1.5, -0.1] {
            let params = SimulationParams {
                damping,
                ..SimulationParams::default()
            };
            match params.validate() {
                Err(Error::InvalidParam { name, .. }) => assert_eq!(name, "damping"),
                other => panic!("expected damping rejection for {damping}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_small_room_defaults_and_bad_json() {
        assert!(LayoutConfig::from_json_str(r#"{ "roomHeight": 5 }"#).is_err());
        assert!(matches!(
            LayoutConfig::from_json_str("{ not json"),
            Err(Error::Config(_))
        ));
    }
}
