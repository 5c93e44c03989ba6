// livescan/examples/simulated_scan.rs

use anyhow::Result;
use livescan::prelude::*;
use livescan_simulation::{RecordingFeedback, ScriptedDecoder, SimulatedDevices};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG=debug 可以看到选择与去重细节
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1. 模拟一台有前后摄像头的手机
    let devices = Arc::new(SimulatedDevices::with_labels(&[
        ("front-0", "Front Camera"),
        ("back-1", "Back Ultra Wide Camera"),
        ("back-0", "Back Camera"),
    ]));
    let decoder = ScriptedDecoder::new();
    let handle = decoder.handle();
    let feedback = Arc::new(RecordingFeedback::new());

    let mut session = ScanSession::builder(devices, Box::new(decoder))
        .feedback(feedback.clone())
        .build()?;

    // 2. 枚举 → 选择 → 配置 → 启动
    session
        .initialize(&RenderTarget::new("#scanner-container"))
        .await?;
    if let Some(camera) = session.selected_device() {
        println!("Selected camera: {} ({})", camera.label, camera.id);
    }

    // 3. 在另一个任务里模拟解码器连续回调 (同一个码会被连着识别好几帧)
    let producer = tokio::spawn(async move {
        let script = [
            ("123456789012", 0),
            ("123456789012", 200),
            ("987654321098", 100),
            ("123456789012", 1700),
        ];
        for (code, delay) in script {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            handle.emit(code);
        }
    });

    // 4. 消费被接受的码，直到脚本结束
    let collect = async {
        while let Some(code) = session.next_accepted().await {
            println!("Scanned: {}", code);
        }
    };
    let _ = tokio::time::timeout(Duration::from_millis(2500), collect).await;
    producer.await?;

    session.stop().await;

    println!("Scan log: {:?}", session.scan_log());
    println!("Beeps: {}", feedback.beeps());
    println!("{:?}", session.telemetry());
    Ok(())
}
