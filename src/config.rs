//! Kernel configuration: binding slots and work-group shape.

use crate::error::{Error, Result};

/// Binding slot for the read-write target buffer, matching the original
/// shader's layout convention.
pub const DEFAULT_TARGET_SLOT: u32 = 5;

/// Binding slot for the read-only offsets buffer.
pub const DEFAULT_OFFSETS_SLOT: u32 = 6;

/// Default work-group width (invocations along x).
pub const DEFAULT_WORKGROUP_WIDTH: u32 = 16;

/// Default work-group height (invocations along y).
pub const DEFAULT_WORKGROUP_HEIGHT: u32 = 1;

// WebGPU guarantees at least 256 invocations per work group; binding
// numbers must stay below the per-group limit.
const MAX_INVOCATIONS: u32 = 256;
const MAX_BINDING_SLOT: u32 = 640;

/// Configuration for an offset-add kernel instance.
///
/// Binding slots are explicit parameters rather than hard-coded constants so
/// that several kernel instances can coexist in one pipeline without slot
/// collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelConfig {
    /// Slot the read-write target buffer binds to.
    pub target_slot: u32,
    /// Slot the read-only offsets buffer binds to.
    pub offsets_slot: u32,
    /// Work-group width (x dimension).
    pub workgroup_width: u32,
    /// Work-group height (y dimension).
    pub workgroup_height: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            target_slot: DEFAULT_TARGET_SLOT,
            offsets_slot: DEFAULT_OFFSETS_SLOT,
            workgroup_width: DEFAULT_WORKGROUP_WIDTH,
            workgroup_height: DEFAULT_WORKGROUP_HEIGHT,
        }
    }
}

impl KernelConfig {
    /// Start building a config from the defaults
    pub fn builder() -> KernelConfigBuilder {
        KernelConfigBuilder::new()
    }

    /// Check slot and work-group constraints
    pub fn validate(&self) -> Result<()> {
        if self.target_slot == self.offsets_slot {
            return Err(Error::config("target and offsets slots must differ"));
        }
        if self.target_slot >= MAX_BINDING_SLOT || self.offsets_slot >= MAX_BINDING_SLOT {
            return Err(Error::config(format!(
                "binding slots must be < {MAX_BINDING_SLOT}"
            )));
        }
        if self.workgroup_width == 0 || self.workgroup_height == 0 {
            return Err(Error::config("work-group dimensions must be > 0"));
        }
        // Widened to u64: the u32 product can overflow for dimensions far
        // beyond the cap.
        let invocations = self.workgroup_width as u64 * self.workgroup_height as u64;
        if invocations > MAX_INVOCATIONS as u64 {
            return Err(Error::config(format!(
                "work group exceeds {MAX_INVOCATIONS} invocations"
            )));
        }
        Ok(())
    }

    /// Number of invocations in one dispatch, and thus the number of
    /// elements the kernel touches.
    pub fn invocations(&self) -> usize {
        (self.workgroup_width as u64 * self.workgroup_height as u64) as usize
    }
}

/// Builder for [`KernelConfig`]
#[derive(Debug, Default)]
pub struct KernelConfigBuilder {
    config: KernelConfig,
}

impl KernelConfigBuilder {
    /// Create a builder with the default config
    pub fn new() -> Self {
        Self {
            config: KernelConfig::default(),
        }
    }

    /// Binding slot for the read-write target buffer
    pub fn target_slot(mut self, slot: u32) -> Self {
        self.config.target_slot = slot;
        self
    }

    /// Binding slot for the read-only offsets buffer
    pub fn offsets_slot(mut self, slot: u32) -> Self {
        self.config.offsets_slot = slot;
        self
    }

    /// Work-group width (x dimension)
    pub fn workgroup_width(mut self, width: u32) -> Self {
        self.config.workgroup_width = width;
        self
    }

    /// Work-group height (y dimension)
    pub fn workgroup_height(mut self, height: u32) -> Self {
        self.config.workgroup_height = height;
        self
    }

    /// Validate and return the config
    pub fn build(self) -> Result<KernelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = KernelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_slot, 5);
        assert_eq!(config.offsets_slot, 6);
        assert_eq!(config.invocations(), 16);
    }

    #[test]
    fn test_colliding_slots_rejected() {
        let result = KernelConfig::builder()
            .target_slot(3)
            .offsets_slot(3)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let result = KernelConfig::builder().workgroup_width(0).build();
        assert!(result.is_err());

        let result = KernelConfig::builder().workgroup_height(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_invocation_cap() {
        let result = KernelConfig::builder()
            .workgroup_width(32)
            .workgroup_height(16)
            .build();
        assert!(result.is_err());

        let config = KernelConfig::builder()
            .workgroup_width(16)
            .workgroup_height(16)
            .build()
            .unwrap();
        assert_eq!(config.invocations(), 256);
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        // Product overflows u32; must come back as an error, not wrap past
        // the invocation cap.
        let result = KernelConfig::builder()
            .workgroup_width(65_536)
            .workgroup_height(65_536)
            .build();
        assert!(result.is_err());

        let config = KernelConfig {
            workgroup_width: u32::MAX,
            workgroup_height: u32::MAX,
            ..KernelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_custom_slots() {
        let config = KernelConfig::builder()
            .target_slot(0)
            .offsets_slot(1)
            .build()
            .unwrap();
        assert_eq!(config.target_slot, 0);
        assert_eq!(config.offsets_slot, 1);
    }
}
