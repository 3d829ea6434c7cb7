//! The offset-add kernel: WGSL generation, compilation, and dispatch.

use crate::buffer::GpuBuffer;
use crate::config::KernelConfig;
use crate::error::Result;
use wgpu;

/// Element-wise offset-add kernel.
///
/// Each invocation `i` computes `target[i] = target[i] + offsets[i]`; the
/// offsets buffer is never written. Invocations write disjoint indices, so
/// no synchronization is needed within a dispatch.
///
/// The kernel body performs no bounds checking. Buffers shorter than the
/// work-group size are undefined behavior, driver-dependent; the host layer
/// never submits such a dispatch, but the shader itself stays unchecked.
#[derive(Debug)]
pub struct OffsetAddKernel {
    config: KernelConfig,
}

impl OffsetAddKernel {
    /// Kernel with an explicit config
    pub fn new(config: KernelConfig) -> Self {
        Self { config }
    }

    /// Kernel with the original slot and work-group defaults (5/6, 16x1).
    pub fn with_defaults() -> Self {
        Self::new(KernelConfig::default())
    }

    /// The kernel's configuration
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Generate the WGSL source with the configured binding slots and
    /// work-group shape substituted in.
    pub fn shader_source(&self) -> String {
        format!(
            // "target" is a reserved word in WGSL, so the shader calls the
            // read-write buffer "values".
            r#"@group(0) @binding({offsets_slot}) var<storage, read> offsets: array<i32>;
@group(0) @binding({target_slot}) var<storage, read_write> values: array<i32>;

@compute @workgroup_size({width}, {height}, 1)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {{
    let i = global_id.y * {width}u + global_id.x;
    values[i] = values[i] + offsets[i];
}}
"#,
            offsets_slot = self.config.offsets_slot,
            target_slot = self.config.target_slot,
            width = self.config.workgroup_width,
            height = self.config.workgroup_height,
        )
    }

    /// Compile the kernel to a compute pipeline
    pub fn compile(&self, device: &wgpu::Device) -> Result<CompiledKernel> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("offset-add-shader"),
            source: wgpu::ShaderSource::Wgsl(self.shader_source().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("offset-add-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: self.config.offsets_slot,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: self.config.target_slot,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("offset-add-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("offset-add-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Ok(CompiledKernel {
            pipeline,
            bind_group_layout,
            config: self.config,
        })
    }
}

/// Compiled offset-add kernel ready for dispatch
#[derive(Debug)]
pub struct CompiledKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    config: KernelConfig,
}

impl CompiledKernel {
    /// Record and submit one dispatch of a single work group.
    ///
    /// Mutates `target` in place on the GPU; `offsets` is bound read-only.
    pub fn execute(
        &self,
        queue: &wgpu::Queue,
        target: &GpuBuffer,
        offsets: &GpuBuffer,
    ) -> Result<()> {
        let bind_group = target
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("offset-add-bind-group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: self.config.offsets_slot,
                        resource: offsets.buffer().as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: self.config.target_slot,
                        resource: target.buffer().as_entire_binding(),
                    },
                ],
            });

        let mut encoder =
            target
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("offset-add-encoder"),
                });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("offset-add-pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);

            // One work group per dispatch; the group shape comes from the
            // shader's workgroup_size attribute.
            compute_pass.dispatch_workgroups(1, 1, 1);
        }

        queue.submit(Some(encoder.finish()));

        Ok(())
    }

    /// The configuration this kernel was compiled with
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}
