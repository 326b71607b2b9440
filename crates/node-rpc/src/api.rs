//! One trait per concern so callers (and their tests) only depend on what
//! they use.

use crate::RpcResult;
use async_trait::async_trait;
use common::{
    Chat, ChatMessage, ChatRequest, DiscoveredFile, DownloadRecord, Provider, ProxyBytes,
    ProxyRecord, SessionInfo, UploadedFile,
};

#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn register(&self, username: &str, password: &str, seed: &str) -> RpcResult<String>;

    /// Returns the peer id of the logged-in node
    async fn login(&self, username: &str, password: &str) -> RpcResult<String>;

    async fn logout(&self) -> RpcResult<()>;
}

#[async_trait]
pub trait FileApi: Send + Sync {
    /// Publish a local file at `cost`; returns its CID
    async fn put_file(&self, path: &str, cost: f64) -> RpcResult<String>;

    async fn delete_file(&self, cid: &str) -> RpcResult<()>;

    async fn get_uploads(&self) -> RpcResult<Vec<UploadedFile>>;

    async fn get_downloads(&self) -> RpcResult<Vec<DownloadRecord>>;

    async fn discover_file(&self, cid: &str) -> RpcResult<Vec<Provider>>;

    async fn discover_files(&self) -> RpcResult<Vec<DiscoveredFile>>;

    /// Start fetching `cid` from `peer_id` into `path`; returns the session id
    async fn get_file(&self, peer_id: &str, cid: &str, path: &str) -> RpcResult<i64>;
}

#[async_trait]
pub trait TransferApi: Send + Sync {
    async fn pause(&self, session_id: i64) -> RpcResult<()>;

    async fn resume(&self, session_id: i64) -> RpcResult<()>;

    async fn get_session(&self, session_id: i64) -> RpcResult<SessionInfo>;
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn get_incoming_chat_requests(&self) -> RpcResult<Vec<ChatRequest>>;

    async fn get_outgoing_chat_requests(&self) -> RpcResult<Vec<ChatRequest>>;

    async fn send_chat_request(&self, peer_id: &str, file_cid: &str) -> RpcResult<ChatRequest>;

    async fn accept_chat_request(&self, peer_id: &str, request_id: i64) -> RpcResult<Chat>;

    async fn decline_chat_request(&self, peer_id: &str, request_id: i64) -> RpcResult<()>;

    async fn close_chat(&self, peer_id: &str, chat_id: i64) -> RpcResult<Chat>;

    async fn get_messages(&self, peer_id: &str, chat_id: i64) -> RpcResult<Vec<ChatMessage>>;

    async fn send_message(&self, peer_id: &str, chat_id: i64, text: &str)
        -> RpcResult<ChatMessage>;
}

#[async_trait]
pub trait ProxyApi: Send + Sync {
    async fn get_all_proxies(&self) -> RpcResult<Vec<ProxyRecord>>;

    async fn connect_to_proxy(&self, peer_id: &str) -> RpcResult<()>;

    async fn disconnect_from_proxy(&self) -> RpcResult<()>;

    async fn register_as_proxy(&self, price: f64, wallet_address: &str) -> RpcResult<()>;

    async fn unregister_as_proxy(&self) -> RpcResult<()>;

    async fn get_proxy_bytes(&self, peer_id: &str) -> RpcResult<ProxyBytes>;
}

#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn balance(&self) -> RpcResult<f64>;

    async fn account_address(&self) -> RpcResult<String>;

    /// Pay `amount` SWE to `address`; returns the transaction id
    async fn transfer(&self, address: &str, amount: f64) -> RpcResult<String>;
}
