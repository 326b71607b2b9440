//! Devnode application state

use crate::config::ServerConfig;
use crate::constants::{DEFAULT_ACCOUNT, INITIAL_BALANCE};
use crate::ledger::Ledger;
use crate::node::NodeState;
use parking_lot::Mutex;

/// Shared by the RPC and wallet listeners
pub struct AppState {
    pub node: Mutex<NodeState>,
    pub ledger: Mutex<Ledger>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            node: Mutex::new(NodeState::seeded(config.chunk_bytes)),
            ledger: Mutex::new(Ledger::with_account(DEFAULT_ACCOUNT, INITIAL_BALANCE)),
        }
    }
}
