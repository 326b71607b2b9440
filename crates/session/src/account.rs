//! Login, wallet balance and the files this node publishes

use crate::error::{SessionError, SessionResult};
use crate::state::StateHandle;
use common::file_utils::normalize_download_path;
use common::{HistoryKind, Identity};
use node_rpc::{AccountApi, FileApi, WalletApi};
use std::path::Path;
use tracing::info;

fn require(value: &str, what: &str) -> SessionResult<()> {
    if value.trim().is_empty() {
        return Err(SessionError::Validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}

/// Create a node account. Nothing is sent unless every field is filled in
/// and both passwords match.
pub async fn register<A>(
    api: &A,
    username: &str,
    password: &str,
    confirm_password: &str,
    seed: &str,
) -> SessionResult<String>
where
    A: AccountApi + ?Sized,
{
    require(username, "Username")?;
    require(password, "Password")?;
    require(seed, "Seed")?;
    if password != confirm_password {
        return Err(SessionError::Validation("Passwords do not match".to_string()));
    }

    let reply = api.register(username, password, seed).await?;
    info!(%username, "Account registered");
    Ok(reply)
}

/// Log the node in, then look up our wallet address and balance
pub async fn login<N, W>(
    node: &N,
    wallet: &W,
    state: &StateHandle,
    username: &str,
    password: &str,
) -> SessionResult<Identity>
where
    N: AccountApi + ?Sized,
    W: WalletApi + ?Sized,
{
    require(username, "Username")?;
    require(password, "Password")?;

    let peer_id = node.login(username, password).await?;
    let wallet_address = wallet.account_address().await?;
    let balance = wallet.balance().await?;

    let identity = Identity {
        peer_id,
        wallet_address,
    };
    state.update(|s| {
        s.set_identity(identity.clone());
        s.set_balance(balance);
    });
    Ok(identity)
}

pub async fn logout<A>(api: &A, state: &StateHandle) -> SessionResult<()>
where
    A: AccountApi + ?Sized,
{
    api.logout().await?;
    state.update(|s| s.clear_identity());
    info!("Logged out");
    Ok(())
}

/// Replace the local balance with the wallet's
pub async fn refresh_balance<W>(wallet: &W, state: &StateHandle) -> SessionResult<f64>
where
    W: WalletApi + ?Sized,
{
    let balance = wallet.balance().await?;
    state.update(|s| s.set_balance(balance));
    Ok(balance)
}

/// Publish a local file at `price` SWE. Returns its CID.
pub async fn upload_file<A>(
    api: &A,
    state: &StateHandle,
    path: &Path,
    price: f64,
) -> SessionResult<String>
where
    A: FileApi + ?Sized,
{
    if price.is_nan() || price < 0.0 {
        return Err(SessionError::Validation(
            "Price cannot be negative".to_string(),
        ));
    }
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(SessionError::Validation(format!(
            "{} is not a file",
            path.display()
        )));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let node_path = normalize_download_path(&path.to_string_lossy());
    let cid = api.put_file(&node_path, price).await?;
    state.update(|s| {
        s.record_history(HistoryKind::Uploaded, &file_name, &cid, metadata.len(), price)
    });
    info!(%cid, file = %file_name, price, "File published");

    refresh_uploads(api, state).await?;
    Ok(cid)
}

pub async fn delete_upload<A>(api: &A, state: &StateHandle, cid: &str) -> SessionResult<()>
where
    A: FileApi + ?Sized,
{
    api.delete_file(cid).await?;
    info!(%cid, "File unpublished");
    refresh_uploads(api, state).await?;
    Ok(())
}

pub async fn refresh_uploads<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: FileApi + ?Sized,
{
    let uploads = api.get_uploads().await?;
    let count = uploads.len();
    state.update(|s| s.set_uploads(uploads));
    Ok(count)
}
