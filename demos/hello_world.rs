//! The classic scenario for this kernel: widen the bytes of "Hello " to
//! i32, add a fixed offset table, and read back "World!".

use offset_add::prelude::*;

async fn run() -> Result<()> {
    println!("Initializing GPU runtime...");
    let runtime = GpuRuntime::get_or_init().await?;

    println!("  Device: {}", runtime.adapter_info().name);
    println!("  Backend: {:?}", runtime.adapter_info().backend);

    // 16 lanes: the message padded with NULs, and the per-character shifts
    let target = b"Hello \0\0\0\0\0\0\0\0\0\0".map(|c| c as i32);
    let offsets = [15, 10, 6, 0, -11, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];

    let kernel = OffsetAddKernel::with_defaults();
    let result = runtime.apply_offsets(&kernel, &target, &offsets).await?;

    let bytes: Vec<u8> = result
        .iter()
        .take_while(|&&n| n != 0)
        .map(|&n| n as u8)
        .collect();
    println!("{}", String::from_utf8_lossy(&bytes));

    let snapshot = runtime.metrics().snapshot();
    println!(
        "{} dispatch(es), {} bytes up / {} bytes down",
        snapshot.dispatches, snapshot.bytes_uploaded, snapshot.bytes_downloaded
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("demo failed: {}", e);
        eprintln!("This may be expected if no GPU is available.");
    }
}
