//! GPU runtime management using wgpu.

use crate::buffer::BufferPool;
use crate::error::{Error, Result};
use crate::kernel::OffsetAddKernel;
use crate::telemetry::DispatchMetrics;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use wgpu;

/// GPU runtime for managing device and queue
#[derive(Debug)]
pub struct GpuRuntime {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    adapter_info: wgpu::AdapterInfo,
    buffer_pool: BufferPool,
    metrics: DispatchMetrics,
}

impl GpuRuntime {
    /// Initialize the GPU runtime
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::gpu("No GPU adapter found"))?;

        let adapter_info = adapter.get_info();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("offset-add-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::gpu(format!("Failed to request device: {}", e)))?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);
        let buffer_pool = BufferPool::new(Arc::clone(&device));

        Ok(Self {
            device,
            queue,
            adapter_info,
            buffer_pool,
            metrics: DispatchMetrics::new(),
        })
    }

    /// Get or initialize the global GPU runtime
    pub async fn get_or_init() -> Result<Arc<Self>> {
        static RUNTIME: RwLock<Option<Arc<GpuRuntime>>> = RwLock::new(None);

        {
            let runtime = RUNTIME.read();
            if let Some(rt) = runtime.as_ref() {
                return Ok(Arc::clone(rt));
            }
        }

        let rt = Arc::new(Self::new().await?);

        let mut runtime = RUNTIME.write();
        if let Some(existing) = runtime.as_ref() {
            return Ok(Arc::clone(existing));
        }
        *runtime = Some(Arc::clone(&rt));
        Ok(rt)
    }

    /// Execute one dispatch of the kernel.
    ///
    /// Uploads `target` and `offsets`, runs a single work group, and returns
    /// the mutated target values. `offsets` is never written by the kernel.
    ///
    /// Both slices must supply at least one element per invocation; elements
    /// past the work-group size are uploaded and returned untouched.
    pub async fn apply_offsets(
        &self,
        kernel: &OffsetAddKernel,
        target: &[i32],
        offsets: &[i32],
    ) -> Result<Vec<i32>> {
        let lanes = kernel.config().invocations();
        if target.len() < lanes {
            return Err(Error::config(format!(
                "target has {} elements, work group needs {}",
                target.len(),
                lanes
            )));
        }
        if offsets.len() < lanes {
            return Err(Error::config(format!(
                "offsets has {} elements, work group needs {}",
                offsets.len(),
                lanes
            )));
        }

        let start = Instant::now();
        let compiled = kernel.compile(&self.device)?;

        let target_bytes: &[u8] = bytemuck::cast_slice(target);
        let offsets_bytes: &[u8] = bytemuck::cast_slice(offsets);

        let target_buffer = self.buffer_pool.acquire(target_bytes.len());
        let offsets_buffer = self.buffer_pool.acquire(offsets_bytes.len());

        target_buffer.write(&self.queue, target_bytes)?;
        offsets_buffer.write(&self.queue, offsets_bytes)?;

        compiled.execute(&self.queue, &target_buffer, &offsets_buffer)?;

        let raw = target_buffer.read_back(&self.queue).await?;
        let result: Vec<i32> = bytemuck::cast_slice(&raw).to_vec();

        self.metrics.record_dispatch(
            start.elapsed().as_nanos() as u64,
            (target_bytes.len() + offsets_bytes.len()) as u64,
            raw.len() as u64,
        );

        self.buffer_pool.release(offsets_buffer);
        self.buffer_pool.release(target_buffer);

        Ok(result)
    }

    /// Get device reference
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Get queue reference
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Get adapter info
    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }

    /// Get buffer pool
    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    /// Dispatch metrics for this runtime
    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }
}
