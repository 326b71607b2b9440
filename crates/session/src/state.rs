//! Cross-screen application state.
//!
//! `AppState` is the single source of truth for identity, balance, proxy,
//! downloads, listings and chats. Its fields are private; every change goes
//! through a named operation so each transition can be checked and tested on
//! its own. `StateHandle` shares it between the CLI, the pollers and the flows
//! and publishes a revision number after every change.

use crate::chat::{next_status, ChatTransition};
use crate::downloads::merge_session_info;
use crate::error::{SessionError, SessionResult};
use crate::host::HostShell;
use crate::listings::RequestEntry;
use common::file_utils::normalize_download_path;
use common::{
    utils, Chat, ChatMessage, ChatRequest, ChatRequestStatus, ChatStatus, DownloadRecord,
    DownloadStatus, HistoryEntry, HistoryKind, Identity, Listing, ProxyRecord, SessionInfo,
    SessionPrefs, UploadedFile,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct AppState {
    identity: Option<Identity>,
    prefs: SessionPrefs,
    balance: f64,
    downloads: Vec<DownloadRecord>, // newest first
    download_epochs: HashMap<i64, u64>, // bumped on every pause/resume
    current_proxy: Option<ProxyRecord>,
    proxy_candidates: Vec<ProxyRecord>,
    serving_proxy: bool,
    listings: Vec<Listing>,
    incoming_requests: Vec<ChatRequest>,
    chats: HashMap<(String, i64), Chat>, // (counterparty, chat_id) for chats we sell in
    uploads: Vec<UploadedFile>,
    history: Vec<HistoryEntry>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // Identity & wallet

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn own_peer_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.peer_id.as_str())
    }

    pub fn set_identity(&mut self, identity: Identity) {
        info!(peer_id = %identity.peer_id, "Logged in");
        self.identity = Some(identity);
    }

    pub fn clear_identity(&mut self) {
        self.identity = None;
        self.balance = 0.0;
    }

    pub fn prefs(&self) -> &SessionPrefs {
        &self.prefs
    }

    pub fn set_prefs(&mut self, platform: String, download_dir: &str) {
        self.prefs = SessionPrefs {
            platform,
            download_dir: normalize_download_path(download_dir),
        };
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance;
    }

    /// Take `amount` off the local balance after a confirmed payment
    pub fn debit(&mut self, amount: f64) {
        self.balance -= amount;
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Put entries from an earlier run ahead of anything recorded since
    pub fn restore_history(&mut self, mut earlier: Vec<HistoryEntry>) {
        earlier.append(&mut self.history);
        self.history = earlier;
    }

    pub fn record_history(
        &mut self,
        kind: HistoryKind,
        file_name: &str,
        file_cid: &str,
        file_size: u64,
        file_cost: f64,
    ) {
        self.history.push(HistoryEntry {
            date: utils::now(),
            file_name: file_name.to_string(),
            file_cid: file_cid.to_string(),
            file_size,
            file_cost,
            kind,
        });
    }

    // Downloads

    pub fn downloads(&self) -> &[DownloadRecord] {
        &self.downloads
    }

    pub fn download(&self, session_id: i64) -> Option<&DownloadRecord> {
        self.downloads.iter().find(|d| d.session_id == session_id)
    }

    /// Session ids the progress poller should query
    pub fn active_session_ids(&self) -> Vec<i64> {
        self.downloads
            .iter()
            .filter(|d| d.download_status == DownloadStatus::Downloading)
            .map(|d| d.session_id)
            .collect()
    }

    pub fn add_download(&mut self, record: DownloadRecord) -> SessionResult<()> {
        if self.download(record.session_id).is_some() {
            return Err(SessionError::DuplicateSession(record.session_id));
        }
        self.downloads.insert(0, record);
        Ok(())
    }

    /// Pause/resume generation of a download. A poll reply is only merged
    /// while the generation it was sent under is still current.
    pub fn download_epoch(&self, session_id: i64) -> u64 {
        self.download_epochs.get(&session_id).copied().unwrap_or(0)
    }

    /// Merge a reply to a query sent under `epoch`. Replies that predate a
    /// pause or resume are dropped.
    pub fn apply_session_reply(&mut self, session_id: i64, epoch: u64, info: &SessionInfo) -> bool {
        if epoch != self.download_epoch(session_id) {
            debug!(session_id, epoch, "Dropping reply sent before a pause or resume");
            return false;
        }
        self.apply_session_info(session_id, info)
    }

    /// Merge a `p2p_getSession` reply. Returns false when the session is no
    /// longer tracked; such replies are dropped.
    pub fn apply_session_info(&mut self, session_id: i64, info: &SessionInfo) -> bool {
        let Some(record) = self
            .downloads
            .iter_mut()
            .find(|d| d.session_id == session_id)
        else {
            return false;
        };

        let before = record.download_status;
        merge_session_info(record, info);

        if before != DownloadStatus::Done && record.download_status == DownloadStatus::Done {
            let (name, cid, size) = (
                record.file_name.clone(),
                record.data_cid.clone(),
                record.size,
            );
            info!(session_id, file = %name, "Download complete");
            self.record_history(HistoryKind::Downloaded, &name, &cid, size, 0.0);
        }
        true
    }

    /// User-driven Downloading <-> Paused flip
    pub fn set_download_paused(&mut self, session_id: i64, paused: bool) -> SessionResult<()> {
        let record = self
            .downloads
            .iter_mut()
            .find(|d| d.session_id == session_id)
            .ok_or(SessionError::DownloadNotFound(session_id))?;

        let (from, to, action) = if paused {
            (DownloadStatus::Downloading, DownloadStatus::Paused, "pause")
        } else {
            (DownloadStatus::Paused, DownloadStatus::Downloading, "resume")
        };
        if record.download_status != from {
            return Err(SessionError::InvalidDownloadState {
                action,
                status: record.download_status,
            });
        }
        record.download_status = to;
        *self.download_epochs.entry(session_id).or_default() += 1;
        Ok(())
    }

    // Proxy

    pub fn current_proxy(&self) -> Option<&ProxyRecord> {
        self.current_proxy.as_ref()
    }

    pub fn proxy_candidates(&self) -> &[ProxyRecord] {
        &self.proxy_candidates
    }

    pub fn set_proxy_candidates(&mut self, proxies: Vec<ProxyRecord>) {
        self.proxy_candidates = proxies;
    }

    /// At most one proxy connection at a time
    pub fn connect_proxy(&mut self, proxy: ProxyRecord) -> SessionResult<()> {
        if let Some(current) = &self.current_proxy {
            return Err(SessionError::ProxyAlreadyConnected(current.peer_id.clone()));
        }
        self.current_proxy = Some(proxy);
        Ok(())
    }

    pub fn disconnect_proxy(&mut self) -> Option<ProxyRecord> {
        self.current_proxy.take()
    }

    pub fn is_serving_proxy(&self) -> bool {
        self.serving_proxy
    }

    pub fn set_serving_proxy(&mut self, serving: bool) {
        self.serving_proxy = serving;
    }

    // Listings

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn listing(&self, key: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.key() == key)
    }

    /// Listings offered by other peers
    pub fn discovered_listings(&self) -> Vec<&Listing> {
        let own = self.own_peer_id();
        self.listings
            .iter()
            .filter(|l| Some(l.peer_id.as_str()) != own)
            .collect()
    }

    /// Listings this node provides
    pub fn own_listings(&self) -> Vec<&Listing> {
        match self.own_peer_id() {
            Some(own) => self.listings.iter().filter(|l| l.peer_id == own).collect(),
            None => Vec::new(),
        }
    }

    pub fn set_listings(&mut self, listings: Vec<Listing>) {
        self.listings = listings;
    }

    /// Initial annotation: every listing gets the status of the outgoing
    /// request with the same `provider+cid` key, or "not yet"
    pub fn annotate_listings(&mut self, by_key: &HashMap<String, RequestEntry>) {
        for listing in &mut self.listings {
            match by_key.get(&listing.key()) {
                Some(entry) => {
                    listing.request_chat_status = entry.status;
                    listing.request_id = Some(entry.request_id);
                }
                None => {
                    listing.request_chat_status = ChatRequestStatus::NotYet;
                    listing.request_id = None;
                }
            }
        }
    }

    /// Periodic refresh keyed by `request_id`. Only forward moves are taken,
    /// so a stale reply can never walk a status back. Returns the listings
    /// whose transcript should be fetched: `(listing key, peer_id, chat_id)`.
    pub fn apply_outgoing_statuses(
        &mut self,
        by_request_id: &HashMap<i64, RequestEntry>,
    ) -> Vec<(String, String, i64)> {
        let mut transcripts = Vec::new();
        for listing in &mut self.listings {
            let Some(entry) = listing.request_id.and_then(|id| by_request_id.get(&id)) else {
                continue;
            };

            let current = listing.request_chat_status;
            if entry.status != current && entry.status.rank() > current.rank() {
                debug!(
                    key = %listing.key(),
                    from = %current,
                    to = %entry.status,
                    "Chat request status changed"
                );
                listing.request_chat_status = entry.status;
            }

            let wants_transcript = match listing.request_chat_status {
                ChatRequestStatus::Accepted => true,
                ChatRequestStatus::Finished => listing.chat.as_ref().map_or(true, Chat::is_open),
                _ => false,
            };
            if let (Some(chat_id), true) = (entry.chat_id, wants_transcript) {
                transcripts.push((listing.key(), listing.peer_id.clone(), chat_id));
            }
        }
        transcripts
    }

    /// Store a freshly fetched transcript on the listing it belongs to
    pub fn attach_transcript(&mut self, key: &str, chat_id: i64, messages: Vec<ChatMessage>) {
        let buyer = self.own_peer_id().unwrap_or_default().to_string();
        let Some(listing) = self.listings.iter_mut().find(|l| l.key() == key) else {
            return;
        };
        let status = if listing.request_chat_status == ChatRequestStatus::Finished {
            ChatStatus::Finished
        } else {
            ChatStatus::Ongoing
        };
        match &mut listing.chat {
            Some(chat) if chat.chat_id == chat_id => {
                chat.messages = messages;
                if status == ChatStatus::Finished {
                    chat.status = status;
                }
            }
            _ => {
                listing.chat = Some(Chat {
                    chat_id,
                    buyer,
                    seller: listing.peer_id.clone(),
                    file_cid: listing.data_cid.clone(),
                    status,
                    messages,
                });
            }
        }
    }

    /// Buyer sent a chat request for a listing: `not yet -> pending`
    pub fn mark_chat_requested(&mut self, key: &str, request_id: i64) -> SessionResult<()> {
        let listing = self
            .listings
            .iter_mut()
            .find(|l| l.key() == key)
            .ok_or_else(|| SessionError::ListingNotFound(key.to_string()))?;
        listing.request_chat_status =
            next_status(listing.request_chat_status, ChatTransition::Request)?;
        listing.request_id = Some(request_id);
        Ok(())
    }

    // Chats

    pub fn incoming_requests(&self) -> &[ChatRequest] {
        &self.incoming_requests
    }

    pub fn incoming_request(&self, peer_id: &str, request_id: i64) -> Option<&ChatRequest> {
        self.incoming_requests
            .iter()
            .find(|r| r.peer_id == peer_id && r.request_id == request_id)
    }

    /// Replace the incoming list with the node's view, keeping any status we
    /// already moved further along locally
    pub fn set_incoming_requests(&mut self, requests: Vec<ChatRequest>) {
        let previous = std::mem::take(&mut self.incoming_requests);
        self.incoming_requests = requests
            .into_iter()
            .map(|mut request| {
                if let Some(old) = previous
                    .iter()
                    .find(|o| o.peer_id == request.peer_id && o.request_id == request.request_id)
                {
                    if old.status.rank() > request.status.rank() {
                        request.status = old.status;
                    }
                    if request.chat_id.is_none() {
                        request.chat_id = old.chat_id;
                    }
                }
                request
            })
            .collect();

        // chats opened before this session started
        let seller = self.own_peer_id().unwrap_or_default().to_string();
        for request in &self.incoming_requests {
            let status = match request.status {
                ChatRequestStatus::Accepted => ChatStatus::Ongoing,
                ChatRequestStatus::Finished => ChatStatus::Finished,
                _ => continue,
            };
            let Some(chat_id) = request.chat_id else {
                continue;
            };
            self.chats
                .entry((request.peer_id.clone(), chat_id))
                .or_insert_with(|| Chat {
                    chat_id,
                    buyer: request.peer_id.clone(),
                    seller: seller.clone(),
                    file_cid: request.file_cid.clone(),
                    status,
                    messages: Vec::new(),
                });
        }
    }

    /// Seller answered a request (Accept or Decline)
    pub fn resolve_incoming_request(
        &mut self,
        peer_id: &str,
        request_id: i64,
        transition: ChatTransition,
        chat: Option<Chat>,
    ) -> SessionResult<ChatRequestStatus> {
        let request = self
            .incoming_requests
            .iter_mut()
            .find(|r| r.peer_id == peer_id && r.request_id == request_id)
            .ok_or(SessionError::RequestNotFound(request_id))?;
        request.status = next_status(request.status, transition)?;
        let status = request.status;

        if let Some(chat) = chat {
            request.chat_id = Some(chat.chat_id);
            self.chats.insert((peer_id.to_string(), chat.chat_id), chat);
        }
        Ok(status)
    }

    pub fn chats(&self) -> impl Iterator<Item = &Chat> {
        self.chats.values()
    }

    /// Look up a chat from either side of the trade
    pub fn chat(&self, peer_id: &str, chat_id: i64) -> Option<&Chat> {
        self.chats.get(&(peer_id.to_string(), chat_id)).or_else(|| {
            self.listings
                .iter()
                .filter(|l| l.peer_id == peer_id)
                .filter_map(|l| l.chat.as_ref())
                .find(|c| c.chat_id == chat_id)
        })
    }

    /// Where the request behind a chat stands
    pub fn chat_request_status(&self, peer_id: &str, chat_id: i64) -> Option<ChatRequestStatus> {
        if let Some(chat) = self.chats.get(&(peer_id.to_string(), chat_id)) {
            return Some(if chat.is_open() {
                ChatRequestStatus::Accepted
            } else {
                ChatRequestStatus::Finished
            });
        }
        self.listings
            .iter()
            .find(|l| {
                l.peer_id == peer_id && l.chat.as_ref().is_some_and(|c| c.chat_id == chat_id)
            })
            .map(|l| l.request_chat_status)
    }

    /// `accepted -> finished` for whichever side holds the chat
    pub fn finish_chat(&mut self, peer_id: &str, closed: Chat) -> SessionResult<()> {
        let chat_id = closed.chat_id;
        let from = self
            .chat_request_status(peer_id, chat_id)
            .ok_or(SessionError::ChatNotFound(chat_id))?;
        let to = next_status(from, ChatTransition::Finish)?;

        let key = (peer_id.to_string(), chat_id);
        let mut closed = closed;
        closed.status = ChatStatus::Finished;

        if self.chats.contains_key(&key) {
            for request in &mut self.incoming_requests {
                if request.peer_id == peer_id && request.chat_id == Some(chat_id) {
                    request.status = to;
                }
            }
            self.chats.insert(key, closed);
            return Ok(());
        }

        if let Some(listing) = self.listings.iter_mut().find(|l| {
            l.peer_id == peer_id && l.chat.as_ref().is_some_and(|c| c.chat_id == chat_id)
        }) {
            listing.request_chat_status = to;
            listing.chat = Some(closed);
        }
        Ok(())
    }

    pub fn set_messages(&mut self, peer_id: &str, chat_id: i64, messages: Vec<ChatMessage>) {
        if let Some(chat) = self.chat_mut(peer_id, chat_id) {
            chat.messages = messages;
        }
    }

    pub fn push_message(&mut self, peer_id: &str, chat_id: i64, message: ChatMessage) {
        if let Some(chat) = self.chat_mut(peer_id, chat_id) {
            chat.messages.push(message);
        }
    }

    fn chat_mut(&mut self, peer_id: &str, chat_id: i64) -> Option<&mut Chat> {
        let key = (peer_id.to_string(), chat_id);
        if self.chats.contains_key(&key) {
            return self.chats.get_mut(&key);
        }
        self.listings
            .iter_mut()
            .filter(|l| l.peer_id == peer_id)
            .filter_map(|l| l.chat.as_mut())
            .find(|c| c.chat_id == chat_id)
    }

    // Uploads

    pub fn uploads(&self) -> &[UploadedFile] {
        &self.uploads
    }

    pub fn set_uploads(&mut self, uploads: Vec<UploadedFile>) {
        self.uploads = uploads;
    }
}

/// Shared owner of the application state
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<RwLock<AppState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHandle {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(AppState::new())),
            revision: Arc::new(revision),
        }
    }

    /// Ask the host for its platform, then its download directory
    pub async fn initialize(&self, shell: &dyn HostShell) -> SessionResult<()> {
        let platform = shell.platform().await?;
        let download_dir = shell.download_dir().await?;
        self.update(|s| s.set_prefs(platform, &download_dir));
        let prefs = self.read(|s| s.prefs().clone());
        info!(
            platform = %prefs.platform,
            download_dir = %prefs.download_dir,
            "Session initialized"
        );
        Ok(())
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Apply a change and notify subscribers
    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = {
            let mut guard = self.inner.write();
            f(&mut guard)
        };
        self.revision.send_modify(|rev| *rev += 1);
        result
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes on every change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
