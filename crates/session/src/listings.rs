//! Marketplace listings and their chat-request status.
//!
//! On mount the discovered files are flattened into one listing per provider
//! and annotated from the outgoing chat requests (matched by
//! `provider+cid`). After that a 5-second loop re-reads the outgoing
//! requests, matches them by `request_id`, and pulls chat transcripts once a
//! request has been turned into a chat.

use crate::error::SessionResult;
use crate::poller::{spawn_periodic, PollHandle};
use crate::state::StateHandle;
use common::{listing_key, ChatRequest, ChatRequestStatus, DiscoveredFile, Listing};
use futures::future::join_all;
use node_rpc::{ChatApi, FileApi};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CHAT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What we know about an outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEntry {
    pub request_id: i64,
    pub chat_id: Option<i64>,
    pub status: ChatRequestStatus,
}

impl From<&ChatRequest> for RequestEntry {
    fn from(request: &ChatRequest) -> Self {
        Self {
            request_id: request.request_id,
            chat_id: request.chat_id,
            status: request.status,
        }
    }
}

/// One listing per (file, provider) pair
pub fn flatten_discovered(files: &[DiscoveredFile]) -> Vec<Listing> {
    files
        .iter()
        .flat_map(|file| {
            file.providers
                .iter()
                .map(move |provider| Listing::from_provider(file, provider))
        })
        .collect()
}

/// Outgoing requests keyed by `provider+cid`. When the node reports several
/// requests for the same listing the newest (highest id) wins, so each key
/// maps to exactly one status.
pub fn requests_by_listing_key(requests: &[ChatRequest]) -> HashMap<String, RequestEntry> {
    let mut lookup: HashMap<String, RequestEntry> = HashMap::new();
    for request in requests {
        let key = listing_key(&request.peer_id, &request.file_cid);
        match lookup.get(&key) {
            Some(existing) if existing.request_id >= request.request_id => {}
            _ => {
                lookup.insert(key, RequestEntry::from(request));
            }
        }
    }
    lookup
}

pub fn requests_by_id(requests: &[ChatRequest]) -> HashMap<i64, RequestEntry> {
    requests
        .iter()
        .map(|r| (r.request_id, RequestEntry::from(r)))
        .collect()
}

/// Initial mount: discover, fetch outgoing requests, annotate
pub async fn sync_listings<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: FileApi + ChatApi + ?Sized,
{
    let files = api.discover_files().await?;
    let outgoing = api.get_outgoing_chat_requests().await?;

    let listings = flatten_discovered(&files);
    let by_key = requests_by_listing_key(&outgoing);
    let count = listings.len();

    state.update(|s| {
        s.set_listings(listings);
        s.annotate_listings(&by_key);
    });
    info!(files = files.len(), listings = count, "Listings synchronized");
    Ok(count)
}

/// One chat poll tick. Returns how many transcripts were refreshed.
pub async fn refresh_chat_requests<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: ChatApi + ?Sized,
{
    let outgoing = api.get_outgoing_chat_requests().await?;
    let by_id = requests_by_id(&outgoing);
    let wanted = state.update(|s| s.apply_outgoing_statuses(&by_id));

    let transcripts = join_all(wanted.into_iter().map(|(key, peer_id, chat_id)| async move {
        let messages = api.get_messages(&peer_id, chat_id).await;
        (key, chat_id, messages)
    }))
    .await;

    Ok(state.update(|s| {
        let mut refreshed = 0;
        for (key, chat_id, messages) in transcripts {
            match messages {
                Ok(messages) => {
                    s.attach_transcript(&key, chat_id, messages);
                    refreshed += 1;
                }
                Err(e) => warn!(%key, chat_id, "Failed to fetch chat transcript: {}", e),
            }
        }
        refreshed
    }))
}

pub fn spawn_chat_poller<A>(api: Arc<A>, state: StateHandle, period: Duration) -> PollHandle
where
    A: ChatApi + ?Sized + 'static,
{
    spawn_periodic("chat-requests", period, move || {
        let api = api.clone();
        let state = state.clone();
        async move {
            match refresh_chat_requests(api.as_ref(), &state).await {
                Ok(n) => debug!(transcripts = n, "Chat requests refreshed"),
                Err(e) => warn!("Failed to refresh chat requests: {}", e),
            }
        }
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    LowestPrice,
    HighestPrice,
    Name,
}

/// A screen-local filtered and sorted copy of the listings
#[derive(Debug, Clone, Default)]
pub struct ListingView {
    pub search: String,
    pub sort: SortOrder,
}

impl ListingView {
    pub fn new(search: impl Into<String>, sort: SortOrder) -> Self {
        Self {
            search: search.into(),
            sort,
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        listing.file_name.to_lowercase().contains(&needle)
            || listing.data_cid.contains(&self.search)
    }

    pub fn apply<'a, I>(&self, listings: I) -> Vec<Listing>
    where
        I: IntoIterator<Item = &'a Listing>,
    {
        let mut view: Vec<Listing> = listings
            .into_iter()
            .filter(|l| self.matches(l))
            .cloned()
            .collect();
        view.sort_by(|a, b| self.compare(a, b));
        view
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        match self.sort {
            SortOrder::LowestPrice => a.price.total_cmp(&b.price),
            SortOrder::HighestPrice => b.price.total_cmp(&a.price),
            SortOrder::Name => a.file_name.to_lowercase().cmp(&b.file_name.to_lowercase()),
        }
    }
}
