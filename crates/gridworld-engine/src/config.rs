//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Dimensions and RNG seed for a new [`State`](crate::state::State).
///
/// Missing JSON fields fall back to [`Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns. Must be positive.
    pub width: i32,
    /// Number of rows. Must be positive.
    pub height: i32,
    /// Seed for strategies that need randomness.
    pub seed: u64,
}

impl Default for GridConfig {
    /// Defaults to a 5x5 grid with seed 0.
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            seed: 0,
        }
    }
}

impl GridConfig {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// # Errors
    ///
    /// Returns [`EngineError::InvalidDimensions`] unless both dimensions are
    /// positive.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(EngineError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Json`] on malformed input and
    /// [`EngineError::InvalidDimensions`] on non-positive dimensions.
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: GridConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
