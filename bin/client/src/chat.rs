//! Chat screen: requests, transcripts and the live request watcher

use crate::app::{wait_for_enter, App};
use crate::market::print_listing;
use anyhow::{Context, Result};
use common::{listing_key, Chat};
use session::chat;
use session::listings::{refresh_chat_requests, sync_listings};
use session::spawn_chat_poller;

/// Bring incoming requests, listings and buyer-side transcripts up to date
async fn load_chats(app: &App) -> Result<()> {
    chat::refresh_incoming_requests(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load incoming chat requests")?;
    sync_listings(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load listings")?;
    refresh_chat_requests(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load outgoing chat requests")?;
    Ok(())
}

fn print_chat(chat: &Chat) {
    println!(
        "Chat {} about {} ({} <-> {}), {}",
        chat.chat_id, chat.file_cid, chat.buyer, chat.seller, chat.status
    );
    for message in &chat.messages {
        println!(
            "  [{}] {}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            message.from,
            message.text
        );
    }
}

pub async fn request(app: &App, peer_id: &str, cid: &str) -> Result<()> {
    load_chats(app).await?;
    let request_id = chat::request_chat(app.node.as_ref(), &app.state, &listing_key(peer_id, cid))
        .await
        .context("Chat request failed")?;
    println!("✓ Chat requested (request {})", request_id);
    Ok(())
}

pub async fn list_requests(app: &App) -> Result<()> {
    load_chats(app).await?;
    let (incoming, outgoing) = app.state.read(|s| {
        let outgoing: Vec<_> = s
            .listings()
            .iter()
            .filter(|l| l.request_id.is_some())
            .cloned()
            .collect();
        (s.incoming_requests().to_vec(), outgoing)
    });

    println!("Incoming requests:");
    for request in &incoming {
        println!(
            "  #{} from {} for {}: {}{}",
            request.request_id,
            request.peer_id,
            request.file_cid,
            request.status,
            request
                .chat_id
                .map(|id| format!(" (chat {})", id))
                .unwrap_or_default()
        );
    }
    println!("Outgoing requests:");
    for listing in &outgoing {
        print_listing(listing);
    }
    Ok(())
}

pub async fn accept(app: &App, peer_id: &str, request_id: i64) -> Result<()> {
    load_chats(app).await?;
    let chat = chat::accept_request(app.node.as_ref(), &app.state, peer_id, request_id).await?;
    println!("✓ Accepted, chat {} is open", chat.chat_id);
    Ok(())
}

pub async fn decline(app: &App, peer_id: &str, request_id: i64) -> Result<()> {
    load_chats(app).await?;
    chat::decline_request(app.node.as_ref(), &app.state, peer_id, request_id).await?;
    println!("✓ Declined request {}", request_id);
    Ok(())
}

pub async fn show(app: &App, peer_id: &str, chat_id: i64) -> Result<()> {
    load_chats(app).await?;
    chat::load_messages(app.node.as_ref(), &app.state, peer_id, chat_id).await?;
    if let Some(chat) = app.state.read(|s| s.chat(peer_id, chat_id).cloned()) {
        print_chat(&chat);
    }
    Ok(())
}

pub async fn send(app: &App, peer_id: &str, chat_id: i64, text: &str) -> Result<()> {
    load_chats(app).await?;
    chat::send_message(app.node.as_ref(), &app.state, peer_id, chat_id, text).await?;
    println!("✓ Sent");
    Ok(())
}

pub async fn finish(app: &App, peer_id: &str, chat_id: i64) -> Result<()> {
    load_chats(app).await?;
    let chat = chat::finish_chat(app.node.as_ref(), &app.state, peer_id, chat_id).await?;
    print_chat(&chat);
    Ok(())
}

/// Follow outgoing requests until Enter is pressed
pub async fn watch(app: &App) -> Result<()> {
    sync_listings(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load listings")?;
    let poller = spawn_chat_poller(
        app.node.clone(),
        app.state.clone(),
        app.config.chat_poll_interval(),
    );
    let mut changes = app.state.subscribe();
    let mut last = snapshot(app);
    print_rows(&last);

    let stop = wait_for_enter("Watching chat requests, press Enter to stop");
    tokio::pin!(stop);
    loop {
        tokio::select! {
            result = &mut stop => {
                result?;
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = snapshot(app);
                if current != last {
                    print_rows(&current);
                    last = current;
                }
            }
        }
    }
    poller.stop();
    Ok(())
}

type Row = (String, String, usize);

fn snapshot(app: &App) -> Vec<Row> {
    app.state.read(|s| {
        s.listings()
            .iter()
            .filter(|l| l.request_id.is_some())
            .map(|l| {
                (
                    l.key(),
                    l.request_chat_status.to_string(),
                    l.chat.as_ref().map_or(0, |c| c.messages.len()),
                )
            })
            .collect()
    })
}

fn print_rows(rows: &[Row]) {
    for (key, status, messages) in rows {
        println!("  {:<40} {:<10} {} message(s)", key, status, messages);
    }
}
