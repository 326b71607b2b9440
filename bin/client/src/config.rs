//! Client configuration: flags with environment fallbacks

use crate::constants::{
    CHAT_POLL_SECS, CLIENT_DATA_DIR, DEFAULT_ACCOUNT, DEFAULT_RPC_URL, DEFAULT_WALLET_URL,
    DOWNLOAD_POLL_SECS,
};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct ClientConfig {
    /// Node JSON-RPC endpoint
    #[arg(long, global = true, env = "SEAWOLF_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Wallet service URL
    #[arg(long, global = true, env = "SEAWOLF_WALLET_URL", default_value = DEFAULT_WALLET_URL)]
    pub wallet_url: String,

    /// Wallet account name
    #[arg(long, global = true, env = "SEAWOLF_ACCOUNT", default_value = DEFAULT_ACCOUNT)]
    pub account: String,

    /// Node username; logs in before running the command
    #[arg(long, global = true, env = "SEAWOLF_USERNAME")]
    pub username: Option<String>,

    /// Node password
    #[arg(long, global = true, env = "SEAWOLF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Where wallet history is kept between runs
    #[arg(long, global = true, env = "SEAWOLF_DATA_DIR", default_value = CLIENT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Seconds between download progress polls
    #[arg(long, global = true, default_value_t = DOWNLOAD_POLL_SECS)]
    pub download_poll_secs: u64,

    /// Seconds between chat request polls
    #[arg(long, global = true, default_value_t = CHAT_POLL_SECS)]
    pub chat_poll_secs: u64,
}

impl ClientConfig {
    pub fn download_poll_interval(&self) -> Duration {
        Duration::from_secs(self.download_poll_secs.max(1))
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_secs(self.chat_poll_secs.max(1))
    }
}
