//! Account, wallet and uploads screens

use crate::app::App;
use anyhow::{Context, Result};
use session::account;
use std::path::Path;

pub async fn register(
    app: &App,
    username: &str,
    password: &str,
    confirm_password: &str,
    seed: &str,
) -> Result<()> {
    let reply = account::register(app.node.as_ref(), username, password, confirm_password, seed)
        .await
        .context("Registration failed")?;
    println!("✓ Registered {}", username);
    if !reply.is_empty() {
        println!("  {}", reply);
    }
    Ok(())
}

pub async fn login(app: &App, username: &str, password: &str) -> Result<()> {
    let identity = account::login(
        app.node.as_ref(),
        app.wallet.as_ref(),
        &app.state,
        username,
        password,
    )
    .await
    .context("Login failed")?;
    println!("✓ Logged in");
    println!("  Peer ID: {}", identity.peer_id);
    println!("  Wallet:  {}", identity.wallet_address);
    println!("  Balance: {} SWE", app.balance());
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    account::logout(app.node.as_ref(), &app.state).await?;
    println!("✓ Logged out");
    Ok(())
}

pub async fn wallet(app: &App) -> Result<()> {
    let balance = account::refresh_balance(app.wallet.as_ref(), &app.state).await?;
    println!("Balance: {} SWE", balance);
    if let Some(identity) = app.state.read(|s| s.identity().cloned()) {
        println!("Wallet:  {}", identity.wallet_address);
    }
    let history = app.state.read(|s| s.history().to_vec());
    if history.is_empty() {
        println!("No history yet");
    }
    for entry in &history {
        println!(
            "  {} {:<10} {:<24} {:>10} B {:>8} SWE",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.kind,
            entry.file_name,
            entry.file_size,
            entry.file_cost
        );
    }
    Ok(())
}

pub async fn upload(app: &App, path: &Path, price: f64) -> Result<()> {
    let cid = account::upload_file(app.node.as_ref(), &app.state, path, price)
        .await
        .with_context(|| format!("Failed to upload {}", path.display()))?;
    println!("✓ Published {} as {}", path.display(), cid);
    Ok(())
}

pub async fn list_uploads(app: &App) -> Result<()> {
    account::refresh_uploads(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load uploads")?;
    let uploads = app.state.read(|s| s.uploads().to_vec());
    if uploads.is_empty() {
        println!("No uploads");
    }
    for upload in &uploads {
        println!(
            "  {:<48} {:<24} {:>10} B {:>8} SWE",
            upload.data_cid, upload.file_name, upload.size, upload.price
        );
    }
    Ok(())
}

pub async fn delete(app: &App, cid: &str) -> Result<()> {
    account::delete_upload(app.node.as_ref(), &app.state, cid).await?;
    println!("✓ Deleted {}", cid);
    Ok(())
}
