//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid config.
//!
//! ```toml
//! [ecs]
//! entity_capacity = 4096
//! freeze_registries_on_start = true
//!
//! [voxel]
//! pool_capacity = 500
//! load_radius = 1
//! ground_level = 0
//! ```

use std::path::Path;

use atlas_voxel::DEFAULT_POOL_CAPACITY;
use serde::Deserialize;

use crate::error::ConfigError;

/// ECS settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Maximum simultaneously live entities.
    pub entity_capacity: usize,
    /// Freeze the bit registries when the engine starts, so late component
    /// or system types fail loudly instead of taking a bit.
    pub freeze_registries_on_start: bool,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            entity_capacity: 4096,
            freeze_registries_on_start: true,
        }
    }
}

/// Voxel world settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoxelConfig {
    /// Chunk slabs in the block pool.
    pub pool_capacity: usize,
    /// Chebyshev radius, in chunks, kept loaded around the focus.
    pub load_radius: u32,
    /// World-space Y below which generated terrain is solid.
    pub ground_level: i32,
}

impl Default for VoxelConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            load_radius: 1,
            ground_level: 0,
        }
    }
}

impl VoxelConfig {
    /// Chunks resident at once for the configured radius, `(2r + 1)^3`.
    ///
    /// `None` on overflow.
    #[must_use]
    pub fn resident_chunks(&self) -> Option<usize> {
        let side = usize::try_from(self.load_radius)
            .ok()?
            .checked_mul(2)?
            .checked_add(1)?;
        side.checked_mul(side)?.checked_mul(side)
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// ECS settings.
    pub ecs: EcsConfig,
    /// Voxel settings.
    pub voxel: VoxelConfig,
}

impl EngineConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] if validation fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use atlas::EngineConfig;
    ///
    /// let config = EngineConfig::from_toml_str("[voxel]\nload_radius = 2\n").unwrap();
    /// assert_eq!(config.voxel.load_radius, 2);
    /// assert_eq!(config.ecs.entity_capacity, 4096);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks that the values can actually run.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ecs.entity_capacity == 0 {
            return Err(ConfigError::Invalid("ecs.entity_capacity must be > 0".into()));
        }
        if u32::try_from(self.ecs.entity_capacity).is_err() {
            return Err(ConfigError::Invalid(format!(
                "ecs.entity_capacity must fit in u32, got {}",
                self.ecs.entity_capacity
            )));
        }
        if self.voxel.pool_capacity == 0 {
            return Err(ConfigError::Invalid("voxel.pool_capacity must be > 0".into()));
        }

        match self.voxel.resident_chunks() {
            Some(needed) if needed <= self.voxel.pool_capacity => Ok(()),
            needed => Err(ConfigError::Invalid(format!(
                "voxel.load_radius {} needs {} chunks but voxel.pool_capacity is {}",
                self.voxel.load_radius,
                needed.map_or_else(|| "too many".to_string(), |n| n.to_string()),
                self.voxel.pool_capacity
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voxel.pool_capacity, 500);
        assert_eq!(config.voxel.resident_chunks(), Some(27));
    }

    #[test]
    fn test_empty_text_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_full_config() {
        let text = r"
            [ecs]
            entity_capacity = 128
            freeze_registries_on_start = false

            [voxel]
            pool_capacity = 125
            load_radius = 2
            ground_level = -8
        ";
        let config = EngineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.ecs.entity_capacity, 128);
        assert!(!config.ecs.freeze_registries_on_start);
        assert_eq!(config.voxel.resident_chunks(), Some(125));
        assert_eq!(config.voxel.ground_level, -8);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml_str("[ecs]\nentity_capacty = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = EngineConfig::from_toml_str("[ecs]\nentity_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");

        let err = EngineConfig::from_toml_str("[voxel]\npool_capacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn test_radius_must_fit_pool() {
        let err =
            EngineConfig::from_toml_str("[voxel]\npool_capacity = 26\nload_radius = 1\n").unwrap_err();
        assert!(err.to_string().contains("needs 27 chunks"), "{err}");

        let err = EngineConfig::from_toml_str("[voxel]\nload_radius = 4000000000\n").unwrap_err();
        assert!(err.to_string().contains("too many"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_path("/nonexistent/atlas.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }
}
