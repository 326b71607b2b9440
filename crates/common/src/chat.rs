use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a buyer's chat request for a listing stands
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChatRequestStatus {
    #[serde(rename = "not yet")]
    NotYet,
    Pending,
    Accepted,
    Declined,
    Finished,
}

impl ChatRequestStatus {
    /// Position along the lifecycle; a status never moves to a lower rank.
    /// Declined and Accepted share a rank because they are alternatives.
    pub fn rank(self) -> u8 {
        match self {
            ChatRequestStatus::NotYet => 0,
            ChatRequestStatus::Pending => 1,
            ChatRequestStatus::Accepted | ChatRequestStatus::Declined => 2,
            ChatRequestStatus::Finished => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ChatRequestStatus::Declined | ChatRequestStatus::Finished)
    }
}

impl std::fmt::Display for ChatRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChatRequestStatus::NotYet => "not yet",
            ChatRequestStatus::Pending => "pending",
            ChatRequestStatus::Accepted => "accepted",
            ChatRequestStatus::Declined => "declined",
            ChatRequestStatus::Finished => "finished",
        };
        f.pad(s)
    }
}

/// A chat request as the node reports it (incoming or outgoing)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub request_id: i64,
    pub peer_id: String,
    pub file_cid: String,
    pub status: ChatRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Ongoing,
    Finished,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chat {
    pub chat_id: i64,
    pub buyer: String,
    pub seller: String,
    pub file_cid: String,
    pub status: ChatStatus,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            ChatStatus::Ongoing => "ongoing",
            ChatStatus::Finished => "finished",
        })
    }
}

impl Chat {
    pub fn is_open(&self) -> bool {
        self.status == ChatStatus::Ongoing
    }
}
