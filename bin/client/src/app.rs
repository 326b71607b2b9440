//! Wiring shared by every subcommand

use crate::config::ClientConfig;
use crate::history::HistoryStore;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use node_rpc::{RpcClient, WalletClient};
use session::account;
use session::{NativeShell, StateHandle};
use std::sync::Arc;

pub struct App {
    pub node: Arc<RpcClient>,
    pub wallet: Arc<WalletClient>,
    pub state: StateHandle,
    pub config: ClientConfig,
    history: HistoryStore,
}

impl App {
    /// Build the clients, read host settings and earlier wallet history.
    /// Logs in when credentials are configured, otherwise only the wallet
    /// balance is loaded.
    pub async fn start(config: ClientConfig) -> Result<Self> {
        let node = Arc::new(RpcClient::new(config.rpc_url.clone()));
        let wallet = Arc::new(WalletClient::new(
            config.wallet_url.clone(),
            config.account.clone(),
        ));
        let state = StateHandle::new();
        state
            .initialize(&NativeShell)
            .await
            .context("Failed to read host settings")?;

        let history = HistoryStore::new(&config.data_dir);
        let earlier = history.load()?;
        debug!("Loaded {} history entries from {:?}", earlier.len(), history.path());
        state.update(|s| s.restore_history(earlier));

        let app = Self {
            node,
            wallet,
            state,
            config,
            history,
        };
        app.sign_in().await?;
        Ok(app)
    }

    async fn sign_in(&self) -> Result<()> {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                let identity = account::login(
                    self.node.as_ref(),
                    self.wallet.as_ref(),
                    &self.state,
                    username,
                    password,
                )
                .await
                .context("Login failed")?;
                info!("Signed in as {}", identity.peer_id);
            }
            _ => {
                debug!("No credentials configured, continuing without login");
                if let Err(e) = account::refresh_balance(self.wallet.as_ref(), &self.state).await {
                    warn!("Failed to read wallet balance: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Write the history back, including whatever this run recorded
    pub fn save_history(&self) -> Result<()> {
        let entries = self.state.read(|s| s.history().to_vec());
        self.history.save(&entries)
    }

    pub fn balance(&self) -> f64 {
        self.state.read(|s| s.balance())
    }
}

/// Block until the user presses Enter
pub async fn wait_for_enter(prompt: &str) -> Result<()> {
    println!("{}", prompt);
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).map(|_| ())
    })
    .await
    .context("Input task failed")?
    .context("Failed to read from stdin")
}
