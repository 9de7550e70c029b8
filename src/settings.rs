//! Simulation configuration
//!
//! Surface extents, tick length and seed are fixed for a session. Substance
//! parameters can be overridden per spawn through a
//! [`SpawnRequest`](crate::sim::SpawnRequest).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};

/// Per-substance size range, piece budget, speeds and lifecycle timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstanceParams {
    /// Size of a freshly split piece
    pub min_size: f32,
    /// Size of the sole piece while collapsing
    pub max_size: f32,
    /// Pieces present right after a split
    pub piece_budget: u32,
    /// Lower bound of per-axis speed (units per tick)
    pub min_speed: f32,
    /// Upper bound of per-axis speed (units per tick)
    pub max_speed: f32,
    /// Collision checks stay off this long after a split
    pub settle_delay_ms: f32,
    /// Pause before the collapse shrink starts
    pub collapse_delay_ms: f32,
    /// Length of the collapse shrink
    pub collapse_duration_ms: f32,
}

impl Default for SubstanceParams {
    fn default() -> Self {
        Self {
            min_size: MIN_SIZE,
            max_size: MAX_SIZE,
            piece_budget: PIECE_BUDGET,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            settle_delay_ms: SETTLE_DELAY_MS,
            collapse_delay_ms: COLLAPSE_DELAY_MS,
            collapse_duration_ms: COLLAPSE_DURATION_MS,
        }
    }
}

impl SubstanceParams {
    /// `max_size - min_size`
    #[inline]
    pub fn growth_range(&self) -> f32 {
        self.max_size - self.min_size
    }

    /// Fixed size bonus an absorber gets on top of the prey's excess
    #[inline]
    pub fn growth_per_absorption(&self) -> f32 {
        self.growth_range() / self.piece_budget as f32
    }

    pub fn validate(&self) -> SimResult<()> {
        let sizes_ok = self.min_size.is_finite()
            && self.max_size.is_finite()
            && self.min_size > 0.0
            && self.max_size > self.min_size;
        if !sizes_ok {
            return Err(SimError::InvalidSizeRange {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.piece_budget == 0 {
            return Err(SimError::InvalidPieceBudget);
        }
        let speeds_ok = self.min_speed.is_finite()
            && self.max_speed.is_finite()
            && self.min_speed > 0.0
            && self.max_speed >= self.min_speed;
        if !speeds_ok {
            return Err(SimError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        validate_duration("settle_delay_ms", self.settle_delay_ms)?;
        validate_duration("collapse_delay_ms", self.collapse_delay_ms)?;
        validate_duration("collapse_duration_ms", self.collapse_duration_ms)?;
        Ok(())
    }
}

fn validate_duration(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDuration { name, value })
    }
}

/// Session-wide configuration handed to [`Simulation::new`](crate::sim::Simulation::new)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub surface_width: f32,
    pub surface_height: f32,
    /// Simulated milliseconds per `advance()` call
    pub tick_ms: f32,
    /// RNG seed for piece velocities
    pub seed: u64,
    /// Parameters used by `spawn_substance`
    pub substance: SubstanceParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            surface_width: SURFACE_WIDTH,
            surface_height: SURFACE_HEIGHT,
            tick_ms: TICK_MS,
            seed: DEFAULT_SEED,
            substance: SubstanceParams::default(),
        }
    }
}

impl SimConfig {
    /// Default config on a surface of the given size
    pub fn with_surface(width: f32, height: f32) -> Self {
        Self {
            surface_width: width,
            surface_height: height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        let surface_ok = self.surface_width.is_finite()
            && self.surface_height.is_finite()
            && self.surface_width > 0.0
            && self.surface_height > 0.0;
        if !surface_ok {
            return Err(SimError::InvalidSurface {
                width: self.surface_width,
                height: self.surface_height,
            });
        }
        if !(self.tick_ms.is_finite() && self.tick_ms > 0.0) {
            return Err(SimError::InvalidTickDuration);
        }
        self.substance.validate()
    }

    /// Convert a wall-clock duration to a whole number of ticks (rounded up)
    pub fn ms_to_ticks(&self, ms: f32) -> u64 {
        let ticks = ms / self.tick_ms;
        let nearest = ticks.round();
        // Float noise on an exact multiple (1000 / (1000 / 60)) must not add a tick
        let ticks = if (ticks - nearest).abs() <= nearest.max(1.0) * 1e-6 {
            nearest
        } else {
            ticks.ceil()
        };
        // `as` saturates: huge delays become u64::MAX
        ticks.max(0.0) as u64
    }

    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|e| SimError::ConfigIo(e.to_string()))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
        let params = SubstanceParams::default();
        assert_eq!(params.growth_range(), 160.0);
        assert_eq!(params.growth_per_absorption(), 16.0);
    }

    #[test]
    fn test_rejects_inverted_size_range() {
        let params = SubstanceParams {
            min_size: 200.0,
            max_size: 200.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimError::InvalidSizeRange { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_budget() {
        let params = SubstanceParams {
            piece_budget: 0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(SimError::InvalidPieceBudget));
    }

    #[test]
    fn test_rejects_bad_speed_and_duration() {
        let params = SubstanceParams {
            min_speed: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimError::InvalidSpeedRange { .. })
        ));

        let params = SubstanceParams {
            settle_delay_ms: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SimError::InvalidDuration { name: "settle_delay_ms", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_surface() {
        let config = SimConfig::with_surface(0.0, 600.0);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidSurface { .. })
        ));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            SimConfig::from_json(r#"{ "surface_width": 640, "substance": { "piece_budget": 5 } }"#)
                .unwrap();
        assert_eq!(config.surface_width, 640.0);
        assert_eq!(config.surface_height, SURFACE_HEIGHT);
        assert_eq!(config.substance.piece_budget, 5);
        assert_eq!(config.substance.min_size, MIN_SIZE);
    }

    #[test]
    fn test_from_json_validates() {
        let result = SimConfig::from_json(r#"{ "substance": { "min_size": 300 } }"#);
        assert!(matches!(result, Err(SimError::InvalidSizeRange { .. })));
        assert!(matches!(
            SimConfig::from_json("not json"),
            Err(SimError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimConfig::with_surface(800.0, 600.0);
        let json = config.to_json().unwrap();
        assert_eq!(SimConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_ms_to_ticks_rounds_up() {
        let config = SimConfig {
            tick_ms: 10.0,
            ..Default::default()
        };
        assert_eq!(config.ms_to_ticks(0.0), 0);
        assert_eq!(config.ms_to_ticks(10.0), 1);
        assert_eq!(config.ms_to_ticks(11.0), 2);
        // Just past a multiple still rounds up
        assert_eq!(config.ms_to_ticks(10.00005), 2);
        assert_eq!(config.ms_to_ticks(f32::MAX), u64::MAX);

        let sixty_hz = SimConfig::default();
        assert_eq!(sixty_hz.ms_to_ticks(1000.0), 60);
        assert_eq!(sixty_hz.ms_to_ticks(300.0), 18);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = SimConfig::load("/definitely/not/here/spore-zone.json").unwrap();
        assert_eq!(config, SimConfig::default());
    }
}
