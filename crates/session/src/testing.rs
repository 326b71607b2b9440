//! In-memory node and wallet for unit tests

use async_trait::async_trait;
use common::{
    utils, Chat, ChatMessage, ChatRequest, ChatRequestStatus, ChatStatus, DiscoveredFile,
    DownloadRecord, DownloadStatus, Provider, ProxyBytes, ProxyRecord, SessionInfo, UploadedFile,
};
use node_rpc::methods;
use node_rpc::{
    AccountApi, ChatApi, FileApi, ProxyApi, RpcError, RpcResult, TransferApi, WalletApi,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

pub fn download_record(session_id: i64, status: DownloadStatus) -> DownloadRecord {
    DownloadRecord {
        size: 1000,
        price: 3.0,
        file_name: format!("file{}.bin", session_id),
        data_cid: format!("bafy{}", session_id),
        provider_id: "provider".to_string(),
        session_id,
        download_status: status,
        download_progress: 0,
    }
}

pub fn discovered(cid: &str, name: &str, providers: &[(&str, f64)]) -> DiscoveredFile {
    DiscoveredFile {
        data_cid: cid.to_string(),
        file_name: name.to_string(),
        size: 2048,
        providers: providers
            .iter()
            .map(|(peer_id, price)| Provider {
                peer_id: peer_id.to_string(),
                price: *price,
                wallet_address: format!("{}-wallet", peer_id),
            })
            .collect(),
    }
}

pub fn outgoing(
    request_id: i64,
    peer_id: &str,
    cid: &str,
    status: ChatRequestStatus,
    chat_id: Option<i64>,
) -> ChatRequest {
    ChatRequest {
        request_id,
        peer_id: peer_id.to_string(),
        file_cid: cid.to_string(),
        status,
        chat_id,
    }
}

/// A pending request from `peer_id`
pub fn incoming(request_id: i64, peer_id: &str, cid: &str) -> ChatRequest {
    outgoing(request_id, peer_id, cid, ChatRequestStatus::Pending, None)
}

pub fn proxy(peer_id: &str, price: f64) -> ProxyRecord {
    ProxyRecord {
        peer_id: peer_id.to_string(),
        price,
        wallet_address: format!("{}-wallet", peer_id),
    }
}

#[derive(Default)]
struct Inner {
    calls: Vec<&'static str>,
    next_id: i64,
    sessions: HashMap<i64, SessionInfo>,
    failing_sessions: HashSet<i64>,
    session_steps: HashMap<i64, u64>,
    session_delays: HashMap<i64, VecDeque<Duration>>,
    downloads: Vec<DownloadRecord>,
    discovered: Vec<DiscoveredFile>,
    uploads: Vec<UploadedFile>,
    file_requests: Vec<(String, String, String)>,
    outgoing: Vec<ChatRequest>,
    incoming: Vec<ChatRequest>,
    chats: HashMap<i64, Chat>,
    messages: HashMap<i64, Vec<ChatMessage>>,
    proxies: Vec<ProxyRecord>,
    proxy_bytes: ProxyBytes,
    balance: f64,
    transfers: Vec<(String, f64)>,
    fail_transfers: bool,
}

/// Records every node call by method name; wallet calls are tracked apart
#[derive(Default)]
pub struct MockNode {
    inner: Mutex<Inner>,
}

impl MockNode {
    pub fn new() -> Self {
        let node = Self::default();
        node.inner.lock().next_id = 100;
        node
    }

    fn record(&self, method: &'static str) {
        self.inner.lock().calls.push(method);
    }

    fn next_id(&self) -> i64 {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        inner.next_id
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().calls.clone()
    }

    pub fn count_calls(&self, method: &str) -> usize {
        self.inner.lock().calls.iter().filter(|m| **m == method).count()
    }

    pub fn set_session(&self, session_id: i64, info: SessionInfo) {
        self.inner.lock().sessions.insert(session_id, info);
    }

    pub fn fail_session(&self, session_id: i64) {
        self.inner.lock().failing_sessions.insert(session_id);
    }

    /// Every query moves the session `step` bytes further, like a live node
    pub fn advance_session(&self, session_id: i64, step: u64) {
        self.inner.lock().session_steps.insert(session_id, step);
    }

    /// Hold the next replies for `session_id` back; the reply content is
    /// taken when the query arrives
    pub fn delay_session_replies(&self, session_id: i64, delays: Vec<Duration>) {
        self.inner
            .lock()
            .session_delays
            .insert(session_id, delays.into());
    }

    pub fn set_downloads(&self, downloads: Vec<DownloadRecord>) {
        self.inner.lock().downloads = downloads;
    }

    pub fn set_discovered(&self, files: Vec<DiscoveredFile>) {
        self.inner.lock().discovered = files;
    }

    pub fn set_outgoing(&self, requests: Vec<ChatRequest>) {
        self.inner.lock().outgoing = requests;
    }

    pub fn set_incoming(&self, requests: Vec<ChatRequest>) {
        self.inner.lock().incoming = requests;
    }

    pub fn add_message(&self, chat_id: i64, from: &str, text: &str) {
        self.inner
            .lock()
            .messages
            .entry(chat_id)
            .or_default()
            .push(ChatMessage {
                timestamp: utils::now(),
                from: from.to_string(),
                text: text.to_string(),
            });
    }

    pub fn set_proxies(&self, proxies: Vec<ProxyRecord>) {
        self.inner.lock().proxies = proxies;
    }

    pub fn set_proxy_bytes(&self, bytes: ProxyBytes) {
        self.inner.lock().proxy_bytes = bytes;
    }

    pub fn set_balance(&self, balance: f64) {
        self.inner.lock().balance = balance;
    }

    pub fn fail_transfers(&self) {
        self.inner.lock().fail_transfers = true;
    }

    /// `(address, amount)` of every accepted transfer
    pub fn transfers(&self) -> Vec<(String, f64)> {
        self.inner.lock().transfers.clone()
    }

    /// `(peer_id, cid, path)` of every `p2p_getFile`
    pub fn file_requests(&self) -> Vec<(String, String, String)> {
        self.inner.lock().file_requests.clone()
    }

    fn transcript(&self, chat_id: i64) -> Vec<ChatMessage> {
        self.inner
            .lock()
            .messages
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn remote(method: &str, message: &str) -> RpcError {
    RpcError::Remote {
        method: method.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl AccountApi for MockNode {
    async fn register(&self, username: &str, _password: &str, _seed: &str) -> RpcResult<String> {
        self.record(methods::REGISTER);
        Ok(format!("registered {}", username))
    }

    async fn login(&self, username: &str, _password: &str) -> RpcResult<String> {
        self.record(methods::LOGIN);
        Ok(format!("peer-{}", username))
    }

    async fn logout(&self) -> RpcResult<()> {
        self.record(methods::LOGOUT);
        Ok(())
    }
}

#[async_trait]
impl FileApi for MockNode {
    async fn put_file(&self, path: &str, cost: f64) -> RpcResult<String> {
        self.record(methods::PUT_FILE);
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let cid = format!("bafy-{}", name);
        self.inner.lock().uploads.push(UploadedFile {
            data_cid: cid.clone(),
            file_name: name,
            size: 0,
            price: cost,
        });
        Ok(cid)
    }

    async fn delete_file(&self, cid: &str) -> RpcResult<()> {
        self.record(methods::DELETE_FILE);
        self.inner.lock().uploads.retain(|u| u.data_cid != cid);
        Ok(())
    }

    async fn get_uploads(&self) -> RpcResult<Vec<UploadedFile>> {
        self.record(methods::GET_UPLOADS);
        Ok(self.inner.lock().uploads.clone())
    }

    async fn get_downloads(&self) -> RpcResult<Vec<DownloadRecord>> {
        self.record(methods::GET_DOWNLOADS);
        Ok(self.inner.lock().downloads.clone())
    }

    async fn discover_file(&self, cid: &str) -> RpcResult<Vec<Provider>> {
        self.record(methods::DISCOVER_FILE);
        Ok(self
            .inner
            .lock()
            .discovered
            .iter()
            .find(|f| f.data_cid == cid)
            .map(|f| f.providers.clone())
            .unwrap_or_default())
    }

    async fn discover_files(&self) -> RpcResult<Vec<DiscoveredFile>> {
        self.record(methods::DISCOVER_FILES);
        Ok(self.inner.lock().discovered.clone())
    }

    async fn get_file(&self, peer_id: &str, cid: &str, path: &str) -> RpcResult<i64> {
        self.record(methods::GET_FILE);
        let session_id = self.next_id();
        self.inner.lock().file_requests.push((
            peer_id.to_string(),
            cid.to_string(),
            path.to_string(),
        ));
        Ok(session_id)
    }
}

#[async_trait]
impl TransferApi for MockNode {
    async fn pause(&self, _session_id: i64) -> RpcResult<()> {
        self.record(methods::PAUSE);
        Ok(())
    }

    async fn resume(&self, _session_id: i64) -> RpcResult<()> {
        self.record(methods::RESUME);
        Ok(())
    }

    async fn get_session(&self, session_id: i64) -> RpcResult<SessionInfo> {
        self.record(methods::GET_SESSION);
        let (reply, delay) = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            if inner.failing_sessions.contains(&session_id) {
                return Err(remote(methods::GET_SESSION, "session lookup failed"));
            }
            let info = inner.sessions.entry(session_id).or_default();
            if let Some(step) = inner.session_steps.get(&session_id) {
                info.rx_bytes = (info.rx_bytes + step).min(info.total_bytes);
                info.complete = info.total_bytes > 0 && info.rx_bytes == info.total_bytes;
            }
            let delay = inner
                .session_delays
                .get_mut(&session_id)
                .and_then(VecDeque::pop_front);
            (info.clone(), delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(reply)
    }
}

#[async_trait]
impl ChatApi for MockNode {
    async fn get_incoming_chat_requests(&self) -> RpcResult<Vec<ChatRequest>> {
        self.record(methods::GET_INCOMING_CHAT_REQUESTS);
        Ok(self.inner.lock().incoming.clone())
    }

    async fn get_outgoing_chat_requests(&self) -> RpcResult<Vec<ChatRequest>> {
        self.record(methods::GET_OUTGOING_CHAT_REQUESTS);
        Ok(self.inner.lock().outgoing.clone())
    }

    async fn send_chat_request(&self, peer_id: &str, file_cid: &str) -> RpcResult<ChatRequest> {
        self.record(methods::SEND_CHAT_REQUEST);
        let request = outgoing(
            self.next_id(),
            peer_id,
            file_cid,
            ChatRequestStatus::Pending,
            None,
        );
        self.inner.lock().outgoing.push(request.clone());
        Ok(request)
    }

    async fn accept_chat_request(&self, peer_id: &str, request_id: i64) -> RpcResult<Chat> {
        self.record(methods::ACCEPT_CHAT_REQUEST);
        let chat_id = self.next_id();
        let mut inner = self.inner.lock();
        let file_cid = inner
            .incoming
            .iter()
            .find(|r| r.request_id == request_id)
            .map(|r| r.file_cid.clone())
            .unwrap_or_default();
        let chat = Chat {
            chat_id,
            buyer: peer_id.to_string(),
            seller: "me".to_string(),
            file_cid,
            status: ChatStatus::Ongoing,
            messages: Vec::new(),
        };
        inner.chats.insert(chat_id, chat.clone());
        Ok(chat)
    }

    async fn decline_chat_request(&self, _peer_id: &str, _request_id: i64) -> RpcResult<()> {
        self.record(methods::DECLINE_CHAT_REQUEST);
        Ok(())
    }

    async fn close_chat(&self, peer_id: &str, chat_id: i64) -> RpcResult<Chat> {
        self.record(methods::CLOSE_CHAT);
        let messages = self.transcript(chat_id);
        let mut chat = self.inner.lock().chats.get(&chat_id).cloned().unwrap_or(Chat {
            chat_id,
            buyer: "me".to_string(),
            seller: peer_id.to_string(),
            file_cid: String::new(),
            status: ChatStatus::Ongoing,
            messages: Vec::new(),
        });
        chat.status = ChatStatus::Finished;
        chat.messages = messages;
        Ok(chat)
    }

    async fn get_messages(&self, _peer_id: &str, chat_id: i64) -> RpcResult<Vec<ChatMessage>> {
        self.record(methods::GET_MESSAGES);
        Ok(self.transcript(chat_id))
    }

    async fn send_message(
        &self,
        _peer_id: &str,
        chat_id: i64,
        text: &str,
    ) -> RpcResult<ChatMessage> {
        self.record(methods::SEND_MESSAGE);
        self.add_message(chat_id, "me", text);
        self.transcript(chat_id)
            .pop()
            .ok_or_else(|| remote(methods::SEND_MESSAGE, "message was not stored"))
    }
}

#[async_trait]
impl ProxyApi for MockNode {
    async fn get_all_proxies(&self) -> RpcResult<Vec<ProxyRecord>> {
        self.record(methods::GET_ALL_PROXIES);
        Ok(self.inner.lock().proxies.clone())
    }

    async fn connect_to_proxy(&self, _peer_id: &str) -> RpcResult<()> {
        self.record(methods::CONNECT_TO_PROXY);
        Ok(())
    }

    async fn disconnect_from_proxy(&self) -> RpcResult<()> {
        self.record(methods::DISCONNECT_FROM_PROXY);
        Ok(())
    }

    async fn register_as_proxy(&self, _price: f64, _wallet_address: &str) -> RpcResult<()> {
        self.record(methods::REGISTER_AS_PROXY);
        Ok(())
    }

    async fn unregister_as_proxy(&self) -> RpcResult<()> {
        self.record(methods::UNREGISTER_AS_PROXY);
        Ok(())
    }

    async fn get_proxy_bytes(&self, _peer_id: &str) -> RpcResult<ProxyBytes> {
        self.record(methods::GET_PROXY_BYTES);
        Ok(self.inner.lock().proxy_bytes)
    }
}

#[async_trait]
impl WalletApi for MockNode {
    async fn balance(&self) -> RpcResult<f64> {
        Ok(self.inner.lock().balance)
    }

    async fn account_address(&self) -> RpcResult<String> {
        Ok("mock-wallet".to_string())
    }

    async fn transfer(&self, address: &str, amount: f64) -> RpcResult<String> {
        let mut inner = self.inner.lock();
        if inner.fail_transfers {
            return Err(RpcError::Wallet("insufficient funds".to_string()));
        }
        inner.transfers.push((address.to_string(), amount));
        Ok(format!("tx-{}", inner.transfers.len()))
    }
}
