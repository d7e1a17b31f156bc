//! Navigate to a page, wait for it to finish loading, save a screenshot.

use devtools::RemoteDebugger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_owned());

    let remote = RemoteDebugger::connect("localhost:9222", false).await?;
    remote.page_events(true).await?;

    let (loaded_tx, mut loaded_rx) = tokio::sync::mpsc::channel(1);
    remote
        .callback_event("Page.frameStoppedLoading", move |params| {
            let frame_id = params.string("frameId").unwrap_or_default().to_owned();
            let _ = loaded_tx.try_send(frame_id);
        })
        .await;

    let frame_id = remote.navigate(&url).await?;
    println!("navigating to {url} (frame {frame_id})");

    let _ = loaded_rx.recv().await;

    let png = remote.capture_screenshot("png", 0, true).await?;
    std::fs::write("screenshot.png", &png)?;
    println!("wrote screenshot.png ({} bytes)", png.len());

    remote.close().await?;
    Ok(())
}
