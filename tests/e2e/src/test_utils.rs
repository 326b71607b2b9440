use anyhow::{Context, Result};
use common::ChatRequestStatus;
use session::{Quote, StateHandle};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tokio::time::sleep;

pub async fn wait_for_server(url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", url);

    println!("Waiting for {} to be ready...", url);
    for i in 0..30 {
        match client.get(&health_url).send().await {
            Ok(response) if response.status().is_success() => {
                println!("{} is ready!", url);
                return Ok(());
            }
            _ => {
                if i < 29 {
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    anyhow::bail!("{} did not become ready within 30 seconds", url);
}

/// Confirmation that always agrees, logging what it was shown
pub fn approve(quote: &Quote) -> bool {
    println!("   confirm: {}", quote);
    true
}

pub fn request_status(state: &StateHandle, key: &str) -> Result<ChatRequestStatus> {
    state
        .read(|s| s.listing(key).map(|l| l.request_chat_status))
        .with_context(|| format!("Listing {} disappeared", key))
}

/// Run the terminal client and return its stdout
pub fn run_client(
    client_binary: &Path,
    rpc_url: &str,
    wallet_url: &str,
    args: &[&str],
) -> Result<String> {
    let output = Command::new(client_binary)
        .args(args)
        .env("SEAWOLF_RPC_URL", format!("{}/rpc", rpc_url))
        .env("SEAWOLF_WALLET_URL", wallet_url)
        .env("SEAWOLF_USERNAME", "demo")
        .env("SEAWOLF_PASSWORD", "demo")
        .output()
        .with_context(|| format!("Failed to run client binary: {:?}", client_binary))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Client {:?} failed: {}", args, stderr);
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
