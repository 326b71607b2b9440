use crate::chat::ChatTransition;
use common::file_utils::FileNameError;
use common::{ChatRequestStatus, DownloadStatus};
use node_rpc::RpcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Cannot {transition} a chat request that is {from}")]
    InvalidTransition {
        from: ChatRequestStatus,
        transition: ChatTransition,
    },

    #[error("Not enough SWE: costs {cost}, balance is {balance}")]
    InsufficientFunds { cost: f64, balance: f64 },

    #[error("Cancelled")]
    Cancelled,

    #[error("Listing not found: {0}")]
    ListingNotFound(String),

    #[error("Download session not found: {0}")]
    DownloadNotFound(i64),

    #[error("Download session already tracked: {0}")]
    DuplicateSession(i64),

    #[error("Cannot {action} a download that is {status}")]
    InvalidDownloadState {
        action: &'static str,
        status: DownloadStatus,
    },

    #[error("Already connected to proxy {0}")]
    ProxyAlreadyConnected(String),

    #[error("Proxy not found: {0}")]
    ProxyNotFound(String),

    #[error("Not connected to a proxy")]
    NoProxy,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Chat request not found: {0}")]
    RequestNotFound(i64),

    #[error("Chat not found: {0}")]
    ChatNotFound(i64),

    #[error("Chat {0} is finished")]
    ChatClosed(i64),

    #[error("Invalid file name: {0}")]
    FileName(#[from] FileNameError),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;
