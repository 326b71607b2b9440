use crate::chat::{Chat, ChatRequestStatus};
use serde::{Deserialize, Serialize};

/// Key that ties a listing to an outgoing chat request: `provider + "+" + cid`
pub fn listing_key(peer_id: &str, data_cid: &str) -> String {
    format!("{}+{}", peer_id, data_cid)
}

/// A peer that can serve a file, as reported by discovery
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Provider {
    pub peer_id: String,
    pub price: f64,
    #[serde(default)]
    pub wallet_address: String,
}

/// One entry of `p2p_discoverFiles`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiscoveredFile {
    pub data_cid: String,
    pub file_name: String,
    pub size: u64,
    #[serde(default)]
    pub providers: Vec<Provider>,
}

/// A file offered by one provider, annotated with our chat state for it
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Listing {
    pub size: u64,
    pub data_cid: String,
    pub peer_id: String,
    pub price: f64,
    pub file_name: String,
    pub wallet_address: String,
    pub request_chat_status: ChatRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Chat>,
}

impl Listing {
    pub fn from_provider(file: &DiscoveredFile, provider: &Provider) -> Self {
        Self {
            size: file.size,
            data_cid: file.data_cid.clone(),
            peer_id: provider.peer_id.clone(),
            price: provider.price,
            file_name: file.file_name.clone(),
            wallet_address: provider.wallet_address.clone(),
            request_chat_status: ChatRequestStatus::NotYet,
            request_id: None,
            chat: None,
        }
    }

    pub fn key(&self) -> String {
        listing_key(&self.peer_id, &self.data_cid)
    }
}

/// Reply entry of `p2p_getUploads`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UploadedFile {
    pub data_cid: String,
    pub file_name: String,
    pub size: u64,
    pub price: f64,
}
