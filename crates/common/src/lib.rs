pub mod chat;
pub mod file_utils;
pub mod market;
pub mod rpc;
pub mod transfer;
pub mod utils;
pub mod wallet;

pub use chat::{Chat, ChatMessage, ChatRequest, ChatRequestStatus, ChatStatus};
pub use market::{listing_key, DiscoveredFile, Listing, Provider, UploadedFile};
pub use rpc::{RpcRequest, RpcResponse, JSONRPC_VERSION};
pub use transfer::{DownloadRecord, DownloadStatus, ProxyBytes, ProxyRecord, SessionInfo};
pub use wallet::{AccountRequest, HistoryEntry, HistoryKind, TransferRequest, WalletResponse};

use serde::{Deserialize, Serialize};

/// Who is logged in: the node's peer id and the wallet address payments go to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub peer_id: String,
    pub wallet_address: String,
}

/// Host facts gathered once at startup
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionPrefs {
    pub platform: String,     // "win32", "darwin", "linux", ...
    pub download_dir: String, // already normalized to forward slashes
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}
