//! Downloads screen: list, watch, pause and resume

use crate::app::App;
use anyhow::{Context, Result};
use common::{DownloadRecord, DownloadStatus};
use log::info;
use session::downloads::{pause_download, restore_downloads, resume_download};
use session::spawn_download_poller;

fn percent(record: &DownloadRecord) -> u64 {
    if record.size == 0 {
        return 0;
    }
    record.download_progress.min(record.size) * 100 / record.size
}

fn print_downloads(records: &[DownloadRecord]) {
    for record in records {
        println!(
            "  [{}] {:<24} {:>3}% {:>10}/{} B  {}",
            record.session_id,
            record.file_name,
            percent(record),
            record.download_progress,
            record.size,
            record.download_status
        );
    }
}

pub async fn list_downloads(app: &App, watch: bool) -> Result<()> {
    restore_downloads(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load downloads")?;
    if watch {
        return watch_downloads(app).await;
    }

    let records = app.state.read(|s| s.downloads().to_vec());
    if records.is_empty() {
        println!("No downloads");
    }
    print_downloads(&records);
    Ok(())
}

/// Poll until every download is done, failed or paused
pub async fn watch_downloads(app: &App) -> Result<()> {
    let poller = spawn_download_poller(
        app.node.clone(),
        app.state.clone(),
        app.config.download_poll_interval(),
    );
    let mut changes = app.state.subscribe();

    loop {
        let (records, active) = app
            .state
            .read(|s| (s.downloads().to_vec(), s.active_session_ids().len()));
        print_downloads(&records);
        if active == 0 {
            break;
        }
        if changes.changed().await.is_err() {
            break;
        }
        println!();
    }

    poller.stop();
    let done = app.state.read(|s| {
        s.downloads()
            .iter()
            .filter(|d| d.download_status == DownloadStatus::Done)
            .count()
    });
    info!("{} download(s) complete", done);
    Ok(())
}

pub async fn set_paused(app: &App, session_id: i64, paused: bool) -> Result<()> {
    restore_downloads(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load downloads")?;
    if paused {
        pause_download(app.node.as_ref(), &app.state, session_id).await?;
        println!("✓ Paused session {}", session_id);
    } else {
        resume_download(app.node.as_ref(), &app.state, session_id).await?;
        println!("✓ Resumed session {}", session_id);
    }
    Ok(())
}
