//! Typed clients for the SeaWolf node (JSON-RPC over `POST /rpc`) and the
//! wallet service (`/balance`, `/account`, `/transfer`).

pub mod api;
pub mod client;
pub mod error;
pub mod methods;
pub mod wallet;

pub use api::{AccountApi, ChatApi, FileApi, ProxyApi, TransferApi, WalletApi};
pub use client::RpcClient;
pub use error::{RpcError, RpcResult};
pub use wallet::WalletClient;
