//! Level configuration.
//!
//! Every field has a default, so a partial JSON document such as
//! `{"size": 4, "seed": 42}` is a complete configuration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// Where characters start when a level is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Everyone starts in the top-left room (0, 0).
    Corner,
    /// Each character gets an independent, uniformly random room.
    /// Characters may share a room.
    #[default]
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Rooms per side; the grid is `size × size`.
    pub size: usize,
    /// Upper bound on walls among internal edges, in percent.
    pub max_wall_percent: u8,
    /// Consecutive attempts needed to cross a portal.
    pub portal_duration: u32,
    pub start_policy: StartPolicy,
    /// Fixed seed for reproducible levels. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            size: 10,
            max_wall_percent: 20,
            portal_duration: 2,
            start_policy: StartPolicy::Random,
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.size == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if self.max_wall_percent > 100 {
            return Err(LevelError::WallPercentOutOfRange {
                percent: self.max_wall_percent,
            });
        }
        if self.portal_duration == 0 {
            return Err(LevelError::ZeroPortalDuration);
        }
        Ok(())
    }

    /// Random generator for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_is_valid() {
        let config = LevelConfig::default();
        assert_eq!(config.size, 10);
        assert_eq!(config.max_wall_percent, 20);
        assert_eq!(config.portal_duration, 2);
        assert_eq!(config.start_policy, StartPolicy::Random);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero = LevelConfig {
            size: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(LevelError::EmptyGrid));

        let walls = LevelConfig {
            max_wall_percent: 101,
            ..Default::default()
        };
        assert_eq!(
            walls.validate(),
            Err(LevelError::WallPercentOutOfRange { percent: 101 })
        );

        let portal = LevelConfig {
            portal_duration: 0,
            ..Default::default()
        };
        assert_eq!(portal.validate(), Err(LevelError::ZeroPortalDuration));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: LevelConfig =
            serde_json::from_str(r#"{"size": 4, "start_policy": "corner", "seed": 42}"#).unwrap();
        assert_eq!(config.size, 4);
        assert_eq!(config.start_policy, StartPolicy::Corner);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_wall_percent, 20);
        assert_eq!(config.portal_duration, 2);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = LevelConfig {
            seed: Some(7),
            ..Default::default()
        };
        let a: Vec<u32> = (0..8).map(|_| config.rng().gen()).collect();
        let mut r1 = config.rng();
        let mut r2 = config.rng();
        let b: Vec<u32> = (0..8).map(|_| r1.gen()).collect();
        let c: Vec<u32> = (0..8).map(|_| r2.gen()).collect();
        assert_eq!(b, c);
        // Fresh generators always start from the same value
        assert!(a.iter().all(|v| *v == a[0]));
    }
}
