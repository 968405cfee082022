//! Runtime-mutable alert thresholds, persisted to a JSON file.

use std::path::PathBuf;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::persist;

/// Band the monitored rate is expected to stay within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ThresholdBounds {
    fn default() -> Self {
        Self {
            min: 35.0,
            max: 50.0,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid bounds: min {min} must stay below max {max}")]
    InvalidBounds { min: f64, max: f64 },

    #[error("bound {0} outside the 0-100 range")]
    OutOfRange(f64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed store for the threshold bounds.
///
/// Every mutation validates first and persists before the in-memory
/// value changes, so a rejected or failed update leaves the observable
/// bounds untouched.
pub struct BoundsStore {
    path: PathBuf,
    current: RwLock<ThresholdBounds>,
}

impl BoundsStore {
    /// Loads the bounds file, falling back to defaults when it is
    /// absent or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let current = match persist::read_json::<ThresholdBounds>(&path) {
            Ok(Some(b)) if validate(b).is_ok() => b,
            Ok(Some(b)) => {
                warn!(min = b.min, max = b.max, "bounds file violates invariants; using defaults");
                ThresholdBounds::default()
            }
            Ok(None) => ThresholdBounds::default(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "malformed bounds file; using defaults");
                ThresholdBounds::default()
            }
        };

        info!(min = current.min, max = current.max, "alert bounds loaded");

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn bounds(&self) -> ThresholdBounds {
        *self.current.read()
    }

    pub fn set_min(&self, min: f64) -> Result<(), ConfigError> {
        let next = ThresholdBounds {
            min,
            ..self.bounds()
        };
        self.set_bounds(next)
    }

    pub fn set_max(&self, max: f64) -> Result<(), ConfigError> {
        let next = ThresholdBounds {
            max,
            ..self.bounds()
        };
        self.set_bounds(next)
    }

    pub fn set_bounds(&self, next: ThresholdBounds) -> Result<(), ConfigError> {
        validate(next)?;
        persist::write_json_atomic(&self.path, &next)?;

        *self.current.write() = next;
        info!(min = next.min, max = next.max, "alert bounds updated");
        Ok(())
    }
}

fn validate(b: ThresholdBounds) -> Result<(), ConfigError> {
    for v in [b.min, b.max] {
        if !(0.0..=100.0).contains(&v) {
            return Err(ConfigError::OutOfRange(v));
        }
    }
    if b.min >= b.max {
        return Err(ConfigError::InvalidBounds {
            min: b.min,
            max: b.max,
        });
    }
    Ok(())
}
