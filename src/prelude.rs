//! Commonly used types, importable in one line.

pub use crate::config::{KernelConfig, KernelConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::kernel::{CompiledKernel, OffsetAddKernel};
pub use crate::runtime::GpuRuntime;
pub use crate::telemetry::{DispatchMetrics, DispatchSnapshot};

pub use crate::apply_offsets;
