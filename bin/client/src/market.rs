//! Marketplace: browse listings and buy files

use crate::app::App;
use crate::confirm::StdinConfirm;
use crate::transfers;
use anyhow::{Context, Result};
use clap::ValueEnum;
use common::{listing_key, Listing};
use session::listings::sync_listings;
use session::purchase::purchase_listing;
use session::{ListingView, SortOrder};

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum SortArg {
    #[default]
    Lowest,
    Highest,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Lowest => SortOrder::LowestPrice,
            SortArg::Highest => SortOrder::HighestPrice,
            SortArg::Name => SortOrder::Name,
        }
    }
}

pub fn print_listing(listing: &Listing) {
    println!(
        "  {:<40} {:<24} {:>10} B {:>8} SWE  chat: {}",
        listing.key(),
        listing.file_name,
        listing.size,
        listing.price,
        listing.request_chat_status
    );
}

pub async fn show_market(app: &App, search: &str, sort: SortArg, own: bool) -> Result<()> {
    sync_listings(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load listings")?;

    let view = ListingView::new(search, sort.into());
    let rows = app.state.read(|s| {
        let listings = if own {
            s.own_listings()
        } else {
            s.discovered_listings()
        };
        view.apply(listings)
    });

    if rows.is_empty() {
        println!("No listings found");
        return Ok(());
    }
    println!("{} listing(s), balance {} SWE", rows.len(), app.balance());
    for listing in &rows {
        print_listing(listing);
    }
    Ok(())
}

pub async fn buy(app: &App, peer_id: &str, cid: &str, assume_yes: bool, watch: bool) -> Result<()> {
    sync_listings(app.node.as_ref(), &app.state)
        .await
        .context("Failed to load listings")?;

    let key = listing_key(peer_id, cid);
    let confirm = StdinConfirm { assume_yes };
    let session_id = purchase_listing(
        app.node.as_ref(),
        app.wallet.as_ref(),
        &app.state,
        &key,
        &confirm,
    )
    .await
    .with_context(|| format!("Failed to buy {}", key))?;

    println!("✓ Download started (session {})", session_id);
    println!("  Balance: {} SWE", app.balance());
    if watch {
        transfers::watch_downloads(app).await?;
    }
    Ok(())
}
