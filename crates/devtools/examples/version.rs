//! Basic example - connecting and printing version information.

use devtools::RemoteDebugger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Chrome started with --remote-debugging-port=9222
    let remote = RemoteDebugger::connect("localhost:9222", false).await?;

    let version = remote.version().await?;
    println!("Browser:  {}", version.browser);
    println!("Protocol: {}", version.protocol_version);

    println!("Domains:");
    for domain in remote.get_domains().await? {
        println!("  {} {}", domain.name, domain.version);
    }

    for tab in remote.tab_list(Some("page")).await? {
        println!("tab {}: {} ({})", tab.id, tab.title, tab.url);
    }

    remote.close().await?;
    Ok(())
}
