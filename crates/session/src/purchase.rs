//! Paid flows: buying a file from a listing and settling a proxy connection.
//!
//! Both go through the same guard: show cost and balance, refuse outright
//! when the balance cannot cover the cost, otherwise wait for the user to
//! confirm. The local balance only moves after the wallet accepted the
//! transfer.

use crate::error::{SessionError, SessionResult};
use crate::state::StateHandle;
use common::file_utils::download_target;
use common::{DownloadRecord, DownloadStatus, HistoryKind, ProxyBytes, ProxyRecord};
use node_rpc::{FileApi, ProxyApi, WalletApi};
use tracing::{info, warn};

const MIB: f64 = 1024.0 * 1024.0;

/// What the user is asked to approve
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub description: String,
    pub cost: f64,
    pub balance: f64,
}

impl Quote {
    pub fn affordable(&self) -> bool {
        self.cost <= self.balance
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} SWE (balance {} SWE)",
            self.description, self.cost, self.balance
        )
    }
}

pub trait Confirm: Send + Sync {
    fn confirm(&self, quote: &Quote) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&Quote) -> bool + Send + Sync,
{
    fn confirm(&self, quote: &Quote) -> bool {
        self(quote)
    }
}

fn guard(quote: &Quote, confirm: &dyn Confirm) -> SessionResult<()> {
    if !quote.affordable() {
        return Err(SessionError::InsufficientFunds {
            cost: quote.cost,
            balance: quote.balance,
        });
    }
    if !confirm.confirm(quote) {
        return Err(SessionError::Cancelled);
    }
    Ok(())
}

/// Pay the provider of `key`, then start the download.
/// Returns the new download session id.
pub async fn purchase_listing<N, W>(
    node: &N,
    wallet: &W,
    state: &StateHandle,
    key: &str,
    confirm: &dyn Confirm,
) -> SessionResult<i64>
where
    N: FileApi + ?Sized,
    W: WalletApi + ?Sized,
{
    let (listing, balance, download_dir) = state.read(|s| {
        (
            s.listing(key).cloned(),
            s.balance(),
            s.prefs().download_dir.clone(),
        )
    });
    let listing = listing.ok_or_else(|| SessionError::ListingNotFound(key.to_string()))?;
    if listing.wallet_address.is_empty() {
        return Err(SessionError::Validation(format!(
            "Provider {} has no wallet address",
            listing.peer_id
        )));
    }

    let quote = Quote {
        description: format!("Buy {} from {}", listing.file_name, listing.peer_id),
        cost: listing.price,
        balance,
    };
    guard(&quote, confirm)?;
    let target = download_target(&download_dir, &listing.file_name)?;

    let txid = wallet.transfer(&listing.wallet_address, listing.price).await?;
    state.update(|s| {
        s.debit(listing.price);
        s.record_history(
            HistoryKind::Buy,
            &listing.file_name,
            &listing.data_cid,
            listing.size,
            listing.price,
        );
    });
    info!(%key, %txid, price = listing.price, "Purchase paid");

    let session_id = node
        .get_file(&listing.peer_id, &listing.data_cid, &target)
        .await?;
    state.update(|s| {
        s.add_download(DownloadRecord {
            size: listing.size,
            price: listing.price,
            file_name: listing.file_name.clone(),
            data_cid: listing.data_cid.clone(),
            provider_id: listing.peer_id.clone(),
            session_id,
            download_status: DownloadStatus::Downloading,
            download_progress: 0,
        })
    })?;
    info!(session_id, %target, "Download started");
    Ok(session_id)
}

/// Reload the proxies we could connect to, minus ourselves
pub async fn refresh_proxies<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: ProxyApi + ?Sized,
{
    let mut proxies = api.get_all_proxies().await?;
    let own = state.read(|s| s.own_peer_id().map(str::to_string));
    proxies.retain(|p| Some(&p.peer_id) != own.as_ref());
    let count = proxies.len();
    state.update(|s| s.set_proxy_candidates(proxies));
    Ok(count)
}

/// Start relaying through `peer_id`. The quote is the per-MiB rate, so a
/// balance below one MiB of traffic is refused.
pub async fn connect_proxy<A>(
    api: &A,
    state: &StateHandle,
    peer_id: &str,
    confirm: &dyn Confirm,
) -> SessionResult<ProxyRecord>
where
    A: ProxyApi + ?Sized,
{
    let (proxy, current, balance) = state.read(|s| {
        (
            s.proxy_candidates()
                .iter()
                .find(|p| p.peer_id == peer_id)
                .cloned(),
            s.current_proxy().map(|p| p.peer_id.clone()),
            s.balance(),
        )
    });
    if let Some(current) = current {
        return Err(SessionError::ProxyAlreadyConnected(current));
    }
    let proxy = proxy.ok_or_else(|| SessionError::ProxyNotFound(peer_id.to_string()))?;

    let quote = Quote {
        description: format!("Relay through {} (per MiB)", proxy.peer_id),
        cost: proxy.price,
        balance,
    };
    guard(&quote, confirm)?;

    api.connect_to_proxy(&proxy.peer_id).await?;
    state.update(|s| s.connect_proxy(proxy.clone()))?;
    info!(peer_id = %proxy.peer_id, price = proxy.price, "Connected to proxy");
    Ok(proxy)
}

/// Outcome of a proxy disconnect
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub proxy: ProxyRecord,
    pub bytes: ProxyBytes,
    pub cost: f64,
    pub txid: Option<String>, // none when nothing was owed
}

/// `(rx + tx) * price / MiB`
pub fn settlement_cost(bytes: &ProxyBytes, price_per_mib: f64) -> f64 {
    bytes.total() as f64 * price_per_mib / MIB
}

/// Disconnect from the current proxy and pay for the relayed traffic.
///
/// Cancelling (or lacking funds) keeps the connection. Once the node has
/// disconnected the singleton is cleared even if the payment then fails.
pub async fn disconnect_proxy<A, W>(
    api: &A,
    wallet: &W,
    state: &StateHandle,
    confirm: &dyn Confirm,
) -> SessionResult<Settlement>
where
    A: ProxyApi + ?Sized,
    W: WalletApi + ?Sized,
{
    let proxy = state
        .read(|s| s.current_proxy().cloned())
        .ok_or(SessionError::NoProxy)?;
    let bytes = api.get_proxy_bytes(&proxy.peer_id).await?;
    let cost = settlement_cost(&bytes, proxy.price);

    let quote = Quote {
        description: format!(
            "Settle {} bytes relayed by {}",
            bytes.total(),
            proxy.peer_id
        ),
        cost,
        balance: state.read(|s| s.balance()),
    };
    guard(&quote, confirm)?;

    api.disconnect_from_proxy().await?;
    state.update(|s| s.disconnect_proxy());

    let txid = if cost > 0.0 {
        let txid = wallet
            .transfer(&proxy.wallet_address, cost)
            .await
            .inspect_err(|e| {
                warn!(peer_id = %proxy.peer_id, cost, "Proxy settlement failed: {}", e)
            })?;
        state.update(|s| s.debit(cost));
        Some(txid)
    } else {
        None
    };

    info!(peer_id = %proxy.peer_id, bytes = bytes.total(), cost, "Disconnected from proxy");
    Ok(Settlement {
        proxy,
        bytes,
        cost,
        txid,
    })
}

/// Offer this node as a relay at `price` SWE per MiB
pub async fn serve_as_proxy<A>(api: &A, state: &StateHandle, price: f64) -> SessionResult<()>
where
    A: ProxyApi + ?Sized,
{
    let wallet_address = state
        .read(|s| s.identity().map(|i| i.wallet_address.clone()))
        .ok_or(SessionError::NotLoggedIn)?;
    if wallet_address.is_empty() {
        return Err(SessionError::Validation(
            "A wallet address is required to serve as a proxy".to_string(),
        ));
    }
    if price.is_nan() || price <= 0.0 {
        return Err(SessionError::Validation(
            "Proxy price must be positive".to_string(),
        ));
    }

    api.register_as_proxy(price, &wallet_address).await?;
    state.update(|s| s.set_serving_proxy(true));
    info!(price, "Serving as proxy");
    Ok(())
}

pub async fn stop_serving_proxy<A>(api: &A, state: &StateHandle) -> SessionResult<()>
where
    A: ProxyApi + ?Sized,
{
    if !state.read(|s| s.is_serving_proxy()) {
        return Err(SessionError::Validation(
            "Not serving as a proxy".to_string(),
        ));
    }
    api.unregister_as_proxy().await?;
    state.update(|s| s.set_serving_proxy(false));
    Ok(())
}
