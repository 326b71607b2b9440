//! Proxy screen: relay through a peer, or serve as one

use crate::app::{wait_for_enter, App};
use crate::confirm::StdinConfirm;
use anyhow::{Context, Result};
use session::purchase::{
    connect_proxy, disconnect_proxy, refresh_proxies, serve_as_proxy, stop_serving_proxy,
};

pub async fn list(app: &App) -> Result<()> {
    refresh_proxies(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load proxies")?;
    let proxies = app.state.read(|s| s.proxy_candidates().to_vec());
    if proxies.is_empty() {
        println!("No proxies available");
    }
    for proxy in &proxies {
        println!("  {:<52} {:>8} SWE/MiB", proxy.peer_id, proxy.price);
    }
    Ok(())
}

/// Relay through `peer_id` until Enter, then settle the bill
pub async fn connect(app: &App, peer_id: &str, assume_yes: bool) -> Result<()> {
    refresh_proxies(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load proxies")?;
    let confirm = StdinConfirm { assume_yes };
    let proxy = connect_proxy(app.node.as_ref(), &app.state, peer_id, &confirm).await?;
    println!("✓ Connected to {} at {} SWE/MiB", proxy.peer_id, proxy.price);

    wait_for_enter("Press Enter to disconnect").await?;

    let settlement = disconnect_proxy(app.node.as_ref(), app.wallet.as_ref(), &app.state, &confirm)
        .await
        .context("Proxy settlement failed")?;
    println!(
        "✓ Disconnected: {} bytes relayed, paid {} SWE{}",
        settlement.bytes.total(),
        settlement.cost,
        settlement
            .txid
            .map(|txid| format!(" (tx {})", txid))
            .unwrap_or_default()
    );
    println!("  Balance: {} SWE", app.balance());
    Ok(())
}

/// Offer this node as a relay until Enter
pub async fn serve(app: &App, price: f64) -> Result<()> {
    serve_as_proxy(app.node.as_ref(), &app.state, price)
        .await
        .context("Failed to register as proxy")?;
    println!("✓ Serving as proxy at {} SWE/MiB", price);

    wait_for_enter("Press Enter to stop serving").await?;

    stop_serving_proxy(app.node.as_ref(), &app.state).await?;
    println!("✓ Stopped serving");
    Ok(())
}
