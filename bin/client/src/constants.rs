/// Default node JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:8081/rpc";

/// Default wallet service URL
pub const DEFAULT_WALLET_URL: &str = "http://localhost:8080";

/// Directory for files kept between runs
pub const CLIENT_DATA_DIR: &str = "client_data";

/// Wallet account used when none is configured
pub const DEFAULT_ACCOUNT: &str = "default";

/// Seconds between download progress polls
pub const DOWNLOAD_POLL_SECS: u64 = session::DOWNLOAD_POLL_INTERVAL.as_secs();

/// Seconds between chat request polls
pub const CHAT_POLL_SECS: u64 = session::CHAT_POLL_INTERVAL.as_secs();
