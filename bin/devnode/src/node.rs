//! Simulated peer-to-peer node.
//!
//! Everything lives in memory: a small catalog of remote files, download
//! sessions that advance on every poll, a seller that accepts chat requests
//! after a couple of polls, and a pair of relay proxies.

use crate::constants::{
    ACCEPT_ON_POLL, DEMO_PASSWORD, DEMO_USERNAME, LOCAL_PEER_ID, PROXY_RX_PER_CALL,
    PROXY_TX_PER_CALL, SELLER_GREETING,
};
use common::{
    utils, Chat, ChatMessage, ChatRequest, ChatRequestStatus, ChatStatus, DiscoveredFile,
    DownloadRecord, DownloadStatus, Provider, ProxyBytes, ProxyRecord, SessionInfo, UploadedFile,
};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

pub type NodeResult<T> = Result<T, String>;

pub const SELLER_A: &str = "12D3KooWSellerAlpha";
pub const SELLER_B: &str = "12D3KooWSellerBravo";
pub const BUYER: &str = "12D3KooWBuyerCharlie";

/// Content identifier for some bytes: "bafy" + hex sha256
pub fn content_id(bytes: &[u8]) -> String {
    format!("bafy{}", hex::encode(Sha256::digest(bytes)))
}

pub fn provider_wallet(peer_id: &str) -> String {
    format!("swe1{}", peer_id.to_lowercase())
}

struct Transfer {
    record: DownloadRecord,
    paused: bool,
}

struct Outgoing {
    request: ChatRequest,
    polls: u32,
}

pub struct NodeState {
    accounts: HashMap<String, String>,
    logged_in: Option<String>,
    catalog: Vec<DiscoveredFile>,
    uploads: Vec<UploadedFile>,
    transfers: BTreeMap<i64, Transfer>,
    outgoing: Vec<Outgoing>,
    incoming: Vec<ChatRequest>,
    chats: HashMap<i64, Chat>,
    proxies: Vec<ProxyRecord>,
    connected: Option<(String, ProxyBytes)>,
    serving: Option<ProxyRecord>,
    chunk_bytes: u64,
    next_id: i64,
}

impl NodeState {
    pub fn seeded(chunk_bytes: u64) -> Self {
        let video = content_id(b"seawolf sample video");
        let album = content_id(b"seawolf sample album");
        let readme = content_id(b"seawolf local readme");

        let provider = |peer_id: &str, price: f64| Provider {
            peer_id: peer_id.to_string(),
            price,
            wallet_address: provider_wallet(peer_id),
        };
        let catalog = vec![
            DiscoveredFile {
                data_cid: video,
                file_name: "ocean.mp4".to_string(),
                size: 3 * 1024 * 1024,
                providers: vec![provider(SELLER_A, 5.0), provider(SELLER_B, 3.0)],
            },
            DiscoveredFile {
                data_cid: album,
                file_name: "tides.flac".to_string(),
                size: 2 * 1024 * 1024,
                providers: vec![provider(SELLER_B, 8.0)],
            },
        ];

        let uploads = vec![UploadedFile {
            data_cid: readme.clone(),
            file_name: "readme.txt".to_string(),
            size: 4096,
            price: 1.0,
        }];
        let incoming = vec![ChatRequest {
            request_id: 1,
            peer_id: BUYER.to_string(),
            file_cid: readme,
            status: ChatRequestStatus::Pending,
            chat_id: None,
        }];

        let proxies = vec![
            ProxyRecord {
                peer_id: "12D3KooWRelayOne".to_string(),
                price: 0.5,
                wallet_address: provider_wallet("12D3KooWRelayOne"),
            },
            ProxyRecord {
                peer_id: "12D3KooWRelayTwo".to_string(),
                price: 1.25,
                wallet_address: provider_wallet("12D3KooWRelayTwo"),
            },
        ];

        Self {
            accounts: HashMap::from([(DEMO_USERNAME.to_string(), DEMO_PASSWORD.to_string())]),
            logged_in: None,
            catalog,
            uploads,
            transfers: BTreeMap::new(),
            outgoing: Vec::new(),
            incoming,
            chats: HashMap::new(),
            proxies,
            connected: None,
            serving: None,
            chunk_bytes,
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Count relayed traffic for every call made while connected
    pub fn record_traffic(&mut self) {
        if let Some((_, bytes)) = &mut self.connected {
            bytes.rx_bytes += PROXY_RX_PER_CALL;
            bytes.tx_bytes += PROXY_TX_PER_CALL;
        }
    }

    // Account

    pub fn register(&mut self, username: &str, password: &str, seed: &str) -> NodeResult<String> {
        if username.is_empty() || password.is_empty() || seed.is_empty() {
            return Err("username, password and seed are required".to_string());
        }
        if self.accounts.contains_key(username) {
            return Err(format!("user {} already exists", username));
        }
        self.accounts
            .insert(username.to_string(), password.to_string());
        info!(username, "Registered account");
        Ok(format!("account {} created", username))
    }

    pub fn login(&mut self, username: &str, password: &str) -> NodeResult<String> {
        match self.accounts.get(username) {
            Some(stored) if stored == password => {
                self.logged_in = Some(username.to_string());
                info!(username, "Logged in");
                Ok(LOCAL_PEER_ID.to_string())
            }
            _ => Err("invalid username or password".to_string()),
        }
    }

    pub fn logout(&mut self) -> NodeResult<()> {
        let username = self.logged_in.take().ok_or_else(|| "not logged in".to_string())?;
        info!(%username, "Logged out");
        Ok(())
    }

    // Files

    pub fn put_file(&mut self, path: &str, contents: &[u8], cost: f64) -> NodeResult<String> {
        if cost < 0.0 {
            return Err("cost cannot be negative".to_string());
        }
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let cid = content_id(contents);
        self.uploads.retain(|u| u.data_cid != cid);
        self.uploads.push(UploadedFile {
            data_cid: cid.clone(),
            file_name,
            size: contents.len() as u64,
            price: cost,
        });
        info!(%cid, path, "File published");
        Ok(cid)
    }

    pub fn delete_file(&mut self, cid: &str) -> NodeResult<()> {
        let before = self.uploads.len();
        self.uploads.retain(|u| u.data_cid != cid);
        if self.uploads.len() == before {
            return Err(format!("file {} not found", cid));
        }
        Ok(())
    }

    pub fn uploads(&self) -> Vec<UploadedFile> {
        self.uploads.clone()
    }

    /// Remote catalog plus our own uploads, provided by us
    pub fn discover_files(&self) -> Vec<DiscoveredFile> {
        let own = self.uploads.iter().map(|u| DiscoveredFile {
            data_cid: u.data_cid.clone(),
            file_name: u.file_name.clone(),
            size: u.size,
            providers: vec![Provider {
                peer_id: LOCAL_PEER_ID.to_string(),
                price: u.price,
                wallet_address: String::new(),
            }],
        });
        self.catalog.iter().cloned().chain(own).collect()
    }

    pub fn discover_file(&self, cid: &str) -> Vec<Provider> {
        self.discover_files()
            .into_iter()
            .filter(|f| f.data_cid == cid)
            .flat_map(|f| f.providers)
            .collect()
    }

    pub fn get_file(&mut self, peer_id: &str, cid: &str, path: &str) -> NodeResult<i64> {
        let (file, provider) = self
            .catalog
            .iter()
            .find_map(|f| {
                f.providers
                    .iter()
                    .find(|p| p.peer_id == peer_id)
                    .filter(|_| f.data_cid == cid)
                    .map(|p| (f.clone(), p.clone()))
            })
            .ok_or_else(|| format!("{} does not provide {}", peer_id, cid))?;

        let session_id = self.next_id();
        self.transfers.insert(
            session_id,
            Transfer {
                record: DownloadRecord {
                    size: file.size,
                    price: provider.price,
                    file_name: file.file_name,
                    data_cid: file.data_cid,
                    provider_id: provider.peer_id,
                    session_id,
                    download_status: DownloadStatus::Downloading,
                    download_progress: 0,
                },
                paused: false,
            },
        );
        info!(session_id, path, "Download session started");
        Ok(session_id)
    }

    pub fn downloads(&self) -> Vec<DownloadRecord> {
        self.transfers.values().rev().map(|t| t.record.clone()).collect()
    }

    fn transfer_mut(&mut self, session_id: i64) -> NodeResult<&mut Transfer> {
        self.transfers
            .get_mut(&session_id)
            .ok_or_else(|| format!("session {} not found", session_id))
    }

    pub fn set_paused(&mut self, session_id: i64, paused: bool) -> NodeResult<()> {
        let transfer = self.transfer_mut(session_id)?;
        if transfer.record.download_status == DownloadStatus::Done {
            return Err(format!("session {} already complete", session_id));
        }
        transfer.paused = paused;
        transfer.record.download_status = if paused {
            DownloadStatus::Paused
        } else {
            DownloadStatus::Downloading
        };
        Ok(())
    }

    /// Report progress, advancing unpaused sessions by one chunk
    pub fn get_session(&mut self, session_id: i64) -> NodeResult<SessionInfo> {
        let chunk = self.chunk_bytes;
        let transfer = self.transfer_mut(session_id)?;
        let record = &mut transfer.record;
        if !transfer.paused && record.download_progress < record.size {
            record.download_progress = (record.download_progress + chunk).min(record.size);
            if record.download_progress == record.size {
                record.download_status = DownloadStatus::Done;
                info!(session_id, "Download session complete");
            }
        }
        Ok(SessionInfo {
            rx_bytes: record.download_progress,
            total_bytes: record.size,
            paused: transfer.paused,
            complete: record.download_progress == record.size,
            result: 0,
        })
    }

    // Chat

    pub fn incoming_requests(&self) -> Vec<ChatRequest> {
        self.incoming.clone()
    }

    /// Every poll ages pending requests; the seller answers on poll
    /// `ACCEPT_ON_POLL` by opening a chat with a greeting
    pub fn outgoing_requests(&mut self) -> Vec<ChatRequest> {
        let mut accepted = Vec::new();
        for entry in &mut self.outgoing {
            if entry.request.status != ChatRequestStatus::Pending {
                continue;
            }
            entry.polls += 1;
            if entry.polls >= ACCEPT_ON_POLL {
                accepted.push(entry.request.request_id);
            }
        }
        for request_id in accepted {
            let chat_id = self.next_id();
            if let Some(entry) = self
                .outgoing
                .iter_mut()
                .find(|o| o.request.request_id == request_id)
            {
                entry.request.status = ChatRequestStatus::Accepted;
                entry.request.chat_id = Some(chat_id);
                let seller = entry.request.peer_id.clone();
                let chat = Chat {
                    chat_id,
                    buyer: LOCAL_PEER_ID.to_string(),
                    seller: seller.clone(),
                    file_cid: entry.request.file_cid.clone(),
                    status: ChatStatus::Ongoing,
                    messages: vec![ChatMessage {
                        timestamp: utils::now(),
                        from: seller,
                        text: SELLER_GREETING.to_string(),
                    }],
                };
                debug!(request_id, chat_id, "Seller accepted chat request");
                self.chats.insert(chat_id, chat);
            }
        }
        self.outgoing.iter().map(|o| o.request.clone()).collect()
    }

    pub fn send_chat_request(&mut self, peer_id: &str, cid: &str) -> NodeResult<ChatRequest> {
        if self.discover_file(cid).iter().all(|p| p.peer_id != peer_id) {
            return Err(format!("{} does not provide {}", peer_id, cid));
        }
        let request = ChatRequest {
            request_id: self.next_id(),
            peer_id: peer_id.to_string(),
            file_cid: cid.to_string(),
            status: ChatRequestStatus::Pending,
            chat_id: None,
        };
        self.outgoing.push(Outgoing {
            request: request.clone(),
            polls: 0,
        });
        Ok(request)
    }

    fn pending_incoming(&mut self, peer_id: &str, request_id: i64) -> NodeResult<&mut ChatRequest> {
        let request = self
            .incoming
            .iter_mut()
            .find(|r| r.peer_id == peer_id && r.request_id == request_id)
            .ok_or_else(|| format!("chat request {} not found", request_id))?;
        if request.status != ChatRequestStatus::Pending {
            return Err(format!("chat request {} is {}", request_id, request.status));
        }
        Ok(request)
    }

    pub fn accept_chat_request(&mut self, peer_id: &str, request_id: i64) -> NodeResult<Chat> {
        let chat_id = self.next_id();
        let request = self.pending_incoming(peer_id, request_id)?;
        request.status = ChatRequestStatus::Accepted;
        request.chat_id = Some(chat_id);
        let chat = Chat {
            chat_id,
            buyer: peer_id.to_string(),
            seller: LOCAL_PEER_ID.to_string(),
            file_cid: request.file_cid.clone(),
            status: ChatStatus::Ongoing,
            messages: Vec::new(),
        };
        self.chats.insert(chat_id, chat.clone());
        Ok(chat)
    }

    pub fn decline_chat_request(&mut self, peer_id: &str, request_id: i64) -> NodeResult<()> {
        self.pending_incoming(peer_id, request_id)?.status = ChatRequestStatus::Declined;
        Ok(())
    }

    fn chat_mut(&mut self, peer_id: &str, chat_id: i64) -> NodeResult<&mut Chat> {
        self.chats
            .get_mut(&chat_id)
            .filter(|c| c.buyer == peer_id || c.seller == peer_id)
            .ok_or_else(|| format!("chat {} not found", chat_id))
    }

    pub fn close_chat(&mut self, peer_id: &str, chat_id: i64) -> NodeResult<Chat> {
        let chat = self.chat_mut(peer_id, chat_id)?;
        chat.status = ChatStatus::Finished;
        let chat = chat.clone();

        let requests = self
            .outgoing
            .iter_mut()
            .map(|o| &mut o.request)
            .chain(self.incoming.iter_mut());
        for request in requests {
            if request.chat_id == Some(chat_id) {
                request.status = ChatRequestStatus::Finished;
            }
        }
        Ok(chat)
    }

    pub fn messages(&mut self, peer_id: &str, chat_id: i64) -> NodeResult<Vec<ChatMessage>> {
        Ok(self.chat_mut(peer_id, chat_id)?.messages.clone())
    }

    pub fn send_message(
        &mut self,
        peer_id: &str,
        chat_id: i64,
        text: &str,
    ) -> NodeResult<ChatMessage> {
        let chat = self.chat_mut(peer_id, chat_id)?;
        if chat.status == ChatStatus::Finished {
            return Err(format!("chat {} is finished", chat_id));
        }
        let message = ChatMessage {
            timestamp: utils::now(),
            from: LOCAL_PEER_ID.to_string(),
            text: text.to_string(),
        };
        chat.messages.push(message.clone());
        Ok(message)
    }

    // Proxy

    pub fn proxies(&self) -> Vec<ProxyRecord> {
        self.proxies.iter().chain(self.serving.iter()).cloned().collect()
    }

    pub fn connect_to_proxy(&mut self, peer_id: &str) -> NodeResult<()> {
        if let Some((current, _)) = &self.connected {
            return Err(format!("already connected to {}", current));
        }
        if self.proxies.iter().all(|p| p.peer_id != peer_id) {
            return Err(format!("proxy {} not found", peer_id));
        }
        self.connected = Some((peer_id.to_string(), ProxyBytes::default()));
        Ok(())
    }

    pub fn disconnect_from_proxy(&mut self) -> NodeResult<()> {
        self.connected
            .take()
            .map(|_| ())
            .ok_or_else(|| "not connected to a proxy".to_string())
    }

    pub fn proxy_bytes(&self, peer_id: &str) -> ProxyBytes {
        match &self.connected {
            Some((current, bytes)) if current == peer_id => *bytes,
            _ => ProxyBytes::default(),
        }
    }

    pub fn register_as_proxy(&mut self, price: f64, wallet_address: &str) -> NodeResult<()> {
        if price <= 0.0 || wallet_address.is_empty() {
            return Err("a positive price and a wallet address are required".to_string());
        }
        self.serving = Some(ProxyRecord {
            peer_id: LOCAL_PEER_ID.to_string(),
            price,
            wallet_address: wallet_address.to_string(),
        });
        Ok(())
    }

    pub fn unregister_as_proxy(&mut self) -> NodeResult<()> {
        self.serving = None;
        Ok(())
    }
}
