use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /account`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccountRequest {
    pub account: String,
}

/// Body of `POST /transfer`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransferRequest {
    pub account: String,
    pub address: String,
    pub amount: f64,
}

/// Envelope used by `/account` and `/transfer`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WalletResponse {
    pub status: String, // "success" or "error"
    pub message: String, // address, txid, or error text
}

impl WalletResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Buy,
    Sell,
    Downloaded,
    Uploaded,
}

impl std::fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            HistoryKind::Buy => "buy",
            HistoryKind::Sell => "sell",
            HistoryKind::Downloaded => "downloaded",
            HistoryKind::Uploaded => "uploaded",
        })
    }
}

/// Append-only wallet / transfer history line
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub file_name: String,
    pub file_cid: String,
    pub file_size: u64,
    pub file_cost: f64,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
}
