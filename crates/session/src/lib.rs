//! Client-side session layer for the SeaWolf exchange.
//!
//! Holds the state every screen shares and keeps it in step with the node:
//! download progress and chat requests are polled in the background, and
//! the user-driven flows (chat, purchase, proxy, uploads) check their guards
//! locally before anything is sent.

pub mod account;
pub mod chat;
pub mod downloads;
pub mod error;
pub mod host;
pub mod listings;
pub mod poller;
pub mod purchase;
pub mod state;

#[cfg(test)]
mod testing;

pub use chat::{next_status, ChatTransition};
pub use downloads::{spawn_download_poller, DOWNLOAD_POLL_INTERVAL};
pub use error::{SessionError, SessionResult};
pub use host::{HostShell, NativeShell};
pub use listings::{spawn_chat_poller, ListingView, SortOrder, CHAT_POLL_INTERVAL};
pub use poller::PollHandle;
pub use purchase::{Confirm, Quote, Settlement};
pub use state::{AppState, StateHandle};
