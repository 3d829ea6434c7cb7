use offset_add::prelude::*;

/// CPU reference for one dispatch over `lanes` elements.
fn cpu_reference(target: &[i32], offsets: &[i32], lanes: usize) -> Vec<i32> {
    let mut out = target.to_vec();
    for i in 0..lanes {
        out[i] = out[i].wrapping_add(offsets[i]);
    }
    out
}

/// These tests need a real adapter; each one skips silently when the
/// runtime cannot be created (headless CI without a GPU).
async fn runtime_or_skip() -> Option<std::sync::Arc<GpuRuntime>> {
    GpuRuntime::get_or_init().await.ok()
}

#[tokio::test]
async fn test_ones_offsets() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let kernel = OffsetAddKernel::with_defaults();
    let target: Vec<i32> = (0..16).collect();
    let offsets = vec![1i32; 16];

    let result = runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();

    let expected: Vec<i32> = (1..=16).collect();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_zero_offsets_identity() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let kernel = OffsetAddKernel::with_defaults();
    let target: Vec<i32> = (0..16).map(|i| i * 7 - 30).collect();
    let offsets = vec![0i32; 16];

    let result = runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();
    assert_eq!(result, target);
}

#[tokio::test]
async fn test_matches_cpu_reference() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let kernel = OffsetAddKernel::with_defaults();
    let target: Vec<i32> = (0..16).map(|i| i * i - 40).collect();
    let offsets: Vec<i32> = (0..16).map(|i| 3 * i - 11).collect();

    let result = runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();
    assert_eq!(result, cpu_reference(&target, &offsets, 16));
}

#[tokio::test]
async fn test_negative_offsets() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let kernel = OffsetAddKernel::with_defaults();
    let target = vec![100i32; 16];
    let offsets: Vec<i32> = (0..16).map(|i| -i).collect();

    let result = runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();
    for (i, value) in result.iter().enumerate() {
        assert_eq!(*value, 100 - i as i32);
    }
}

#[tokio::test]
async fn test_offsets_buffer_unchanged_on_gpu() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    // Drive the buffers directly so the offsets storage buffer itself can
    // be read back after the dispatch.
    let kernel = OffsetAddKernel::with_defaults();
    let compiled = kernel.compile(runtime.device()).unwrap();

    let target = vec![5i32; 16];
    let offsets: Vec<i32> = (0..16).collect();
    let target_bytes: &[u8] = bytemuck::cast_slice(&target);
    let offsets_bytes: &[u8] = bytemuck::cast_slice(&offsets);

    let target_buffer = runtime.buffer_pool().acquire(target_bytes.len());
    let offsets_buffer = runtime.buffer_pool().acquire(offsets_bytes.len());
    target_buffer.write(runtime.queue(), target_bytes).unwrap();
    offsets_buffer.write(runtime.queue(), offsets_bytes).unwrap();

    compiled
        .execute(runtime.queue(), &target_buffer, &offsets_buffer)
        .unwrap();

    // The dispatch ran: the target buffer picked up the offsets.
    let raw = target_buffer.read_back(runtime.queue()).await.unwrap();
    let result: &[i32] = bytemuck::cast_slice(&raw);
    for (i, value) in result.iter().enumerate() {
        assert_eq!(*value, 5 + i as i32);
    }

    // The offsets buffer holds exactly the uploaded bytes.
    let raw = offsets_buffer.read_back(runtime.queue()).await.unwrap();
    assert_eq!(bytemuck::cast_slice::<u8, i32>(&raw), offsets.as_slice());
}

#[tokio::test]
async fn test_custom_slots_same_result() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let target: Vec<i32> = (0..16).collect();
    let offsets: Vec<i32> = (0..16).map(|i| i + 1).collect();

    let default_kernel = OffsetAddKernel::with_defaults();
    let custom_config = KernelConfig::builder()
        .target_slot(0)
        .offsets_slot(1)
        .build()
        .unwrap();
    let custom_kernel = OffsetAddKernel::new(custom_config);

    let a = runtime
        .apply_offsets(&default_kernel, &target, &offsets)
        .await
        .unwrap();
    let b = runtime
        .apply_offsets(&custom_kernel, &target, &offsets)
        .await
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(a, cpu_reference(&target, &offsets, 16));
}

#[tokio::test]
async fn test_hello_world_scenario() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let target = b"Hello \0\0\0\0\0\0\0\0\0\0".map(|c| c as i32);
    let offsets = [15, 10, 6, 0, -11, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

    let kernel = OffsetAddKernel::with_defaults();
    let result = runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();

    let text: Vec<u8> = result
        .iter()
        .take_while(|&&n| n != 0)
        .map(|&n| n as u8)
        .collect();
    assert_eq!(&text, b"World!");
}

#[tokio::test]
async fn test_metrics_recorded() {
    let Some(runtime) = runtime_or_skip().await else {
        return;
    };

    let before = runtime.metrics().snapshot().dispatches;

    let kernel = OffsetAddKernel::with_defaults();
    let target = vec![0i32; 16];
    let offsets = vec![0i32; 16];
    runtime.apply_offsets(&kernel, &target, &offsets).await.unwrap();

    let after = runtime.metrics().snapshot();
    assert!(after.dispatches > before);
    assert!(after.bytes_uploaded >= 128);
    assert!(after.bytes_downloaded >= 64);
}
