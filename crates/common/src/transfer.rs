use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    Downloading,
    Paused,
    Done,
    Error,
}

impl DownloadStatus {
    /// Done and Error are never polled or changed again
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadStatus::Done | DownloadStatus::Error)
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DownloadStatus::Downloading => "Downloading",
            DownloadStatus::Paused => "Paused",
            DownloadStatus::Done => "Done",
            DownloadStatus::Error => "Error",
        };
        f.pad(s)
    }
}

/// One file being fetched from a provider
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DownloadRecord {
    pub size: u64,
    pub price: f64,
    pub file_name: String,
    pub data_cid: String,
    pub provider_id: String,
    pub session_id: i64,
    pub download_status: DownloadStatus,
    pub download_progress: u64, // bytes received so far
}

/// Reply to `p2p_getSession`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionInfo {
    pub rx_bytes: u64,
    pub total_bytes: u64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub result: i32, // nonzero means the transfer failed
}

/// A relay peer offering its bandwidth
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProxyRecord {
    pub peer_id: String,
    pub price: f64, // SWE per MiB relayed
    pub wallet_address: String,
}

/// Reply to `p2p_getProxyBytes`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProxyBytes {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

impl ProxyBytes {
    pub fn total(&self) -> u64 {
        self.rx_bytes + self.tx_bytes
    }
}
