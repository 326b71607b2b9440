/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default JSON-RPC port
pub const DEFAULT_RPC_PORT: &str = "8081";

/// Default wallet service port
pub const DEFAULT_WALLET_PORT: &str = "8080";

/// Bytes a download advances per `p2p_getSession`
pub const DEFAULT_CHUNK_BYTES: &str = "1048576";

/// Wallet account the client uses unless configured otherwise
pub const DEFAULT_ACCOUNT: &str = "default";

/// Starting balance of the default account, in SWE
pub const INITIAL_BALANCE: f64 = 100.0;

/// Peer ID reported after login
pub const LOCAL_PEER_ID: &str = "12D3KooWDevNodeLocalPeer";

/// Seeded login
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

/// Outgoing requests are accepted on this poll of `p2p_getOutgoingChatRequests`
pub const ACCEPT_ON_POLL: u32 = 2;

/// First message the simulated seller sends
pub const SELLER_GREETING: &str = "Hi! Happy to answer questions about this file.";

/// Traffic counted per RPC call while a proxy is connected
pub const PROXY_RX_PER_CALL: u64 = 64 * 1024;
pub const PROXY_TX_PER_CALL: u64 = 16 * 1024;
