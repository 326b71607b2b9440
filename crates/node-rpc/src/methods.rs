//! JSON-RPC method names understood by the node

pub const REGISTER: &str = "p2p_register";
pub const LOGIN: &str = "p2p_login";
pub const LOGOUT: &str = "p2p_logout";

pub const PUT_FILE: &str = "p2p_putFile";
pub const DELETE_FILE: &str = "p2p_deleteFile";
pub const GET_UPLOADS: &str = "p2p_getUploads";
pub const GET_DOWNLOADS: &str = "p2p_getDownloads";
pub const DISCOVER_FILE: &str = "p2p_discoverFile";
pub const DISCOVER_FILES: &str = "p2p_discoverFiles";
pub const GET_FILE: &str = "p2p_getFile";

pub const PAUSE: &str = "p2p_pause";
pub const RESUME: &str = "p2p_resume";
pub const GET_SESSION: &str = "p2p_getSession";

pub const GET_INCOMING_CHAT_REQUESTS: &str = "p2p_getIncomingChatRequests";
pub const GET_OUTGOING_CHAT_REQUESTS: &str = "p2p_getOutgoingChatRequests";
pub const SEND_CHAT_REQUEST: &str = "p2p_sendChatRequest";
pub const ACCEPT_CHAT_REQUEST: &str = "p2p_acceptChatRequest";
pub const DECLINE_CHAT_REQUEST: &str = "p2p_declineChatRequest";
pub const CLOSE_CHAT: &str = "p2p_closeChat";
pub const GET_MESSAGES: &str = "p2p_getMessages";
pub const SEND_MESSAGE: &str = "p2p_sendMessage";

pub const GET_ALL_PROXIES: &str = "p2p_getAllProxies";
pub const CONNECT_TO_PROXY: &str = "p2p_connectToProxy";
pub const DISCONNECT_FROM_PROXY: &str = "p2p_disconnectFromProxy";
pub const REGISTER_AS_PROXY: &str = "p2p_registerAsProxy";
pub const UNREGISTER_AS_PROXY: &str = "p2p_unregisterAsProxy";
pub const GET_PROXY_BYTES: &str = "p2p_getProxyBytes";
