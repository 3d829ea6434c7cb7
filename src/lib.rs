//! Element-wise integer offset addition on the GPU.
//!
//! A small library wrapping a single compute kernel: for each invocation
//! index `i`, `target[i] = target[i] + offsets[i]`. Both buffers hold signed
//! 32-bit integers; the offsets buffer is bound read-only and the target
//! buffer is mutated in place. One dispatch runs exactly one work group,
//! 16x1x1 by default.
//!
//! # Quick Start
//!
//! ```no_run
//! use offset_add::prelude::*;
//!
//! # async fn demo() -> Result<()> {
//! let kernel = OffsetAddKernel::with_defaults();
//!
//! let target: Vec<i32> = (0..16).collect();
//! let offsets = vec![1i32; 16];
//!
//! let result = offset_add::apply_offsets(&kernel, &target, &offsets).await?;
//! assert_eq!(result[0], 1);
//! assert_eq!(result[15], 16);
//! # Ok(())
//! # }
//! ```
//!
//! # Binding slots
//!
//! The original shader hard-coded its storage bindings to slots 5 (target)
//! and 6 (offsets). Here the slots are part of [`KernelConfig`], so several
//! kernel instances can coexist without colliding:
//!
//! ```
//! use offset_add::KernelConfig;
//!
//! let config = KernelConfig::builder()
//!     .target_slot(0)
//!     .offsets_slot(1)
//!     .build()
//!     .unwrap();
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(dead_code)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod kernel;
pub mod prelude;
pub mod runtime;
pub mod telemetry;

pub use config::{KernelConfig, KernelConfigBuilder};
pub use error::{Error, Result};
pub use kernel::{CompiledKernel, OffsetAddKernel};
pub use runtime::GpuRuntime;

/// Run one dispatch of `kernel` on the global runtime.
///
/// Convenience wrapper around [`GpuRuntime::get_or_init`] and
/// [`GpuRuntime::apply_offsets`].
pub async fn apply_offsets(
    kernel: &OffsetAddKernel,
    target: &[i32],
    offsets: &[i32],
) -> Result<Vec<i32>> {
    let runtime = GpuRuntime::get_or_init().await?;
    runtime.apply_offsets(kernel, target, offsets).await
}
