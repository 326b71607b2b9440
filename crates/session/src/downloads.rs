//! Download progress: merging session replies and the 3-second poller

use crate::error::{SessionError, SessionResult};
use crate::poller::{spawn_periodic, PollHandle};
use crate::state::StateHandle;
use common::{DownloadRecord, DownloadStatus, SessionInfo};
use futures::future::join_all;
use node_rpc::{FileApi, TransferApi};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DOWNLOAD_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Fold one `p2p_getSession` reply into a record.
///
/// Progress and size are copied; status becomes Paused, Done or Error when
/// the session says so and is otherwise kept. Done and Error records are
/// left alone.
pub fn merge_session_info(record: &mut DownloadRecord, info: &SessionInfo) {
    if record.download_status.is_terminal() {
        return;
    }

    record.download_progress = info.rx_bytes;
    record.size = info.total_bytes;

    if info.paused {
        record.download_status = DownloadStatus::Paused;
    } else if info.complete {
        record.download_status = DownloadStatus::Done;
    } else if info.result != 0 {
        record.download_status = DownloadStatus::Error;
    }
}

/// Sessions with a `p2p_getSession` query still outstanding. A session is
/// not queried again until its previous reply is back.
#[derive(Clone, Default)]
pub struct InFlight {
    sessions: Arc<Mutex<HashSet<i64>>>,
}

impl InFlight {
    /// Take the ids not already being queried
    fn claim(&self, candidates: Vec<(i64, u64)>) -> Claim {
        let mut sessions = self.sessions.lock();
        let claimed: Vec<(i64, u64)> = candidates
            .into_iter()
            .filter(|(session_id, _)| sessions.insert(*session_id))
            .collect();
        Claim {
            in_flight: self.clone(),
            claimed,
        }
    }
}

/// Released on drop, so an aborted tick frees its sessions too
struct Claim {
    in_flight: InFlight,
    claimed: Vec<(i64, u64)>, // (session_id, epoch)
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut sessions = self.in_flight.sessions.lock();
        for (session_id, _) in &self.claimed {
            sessions.remove(session_id);
        }
    }
}

/// One poll tick: query every Downloading session concurrently and merge.
/// A failed query only skips that download. Returns how many were merged.
pub async fn reconcile_downloads<A>(api: &A, state: &StateHandle) -> usize
where
    A: TransferApi + ?Sized,
{
    reconcile_tracked(api, state, &InFlight::default()).await
}

/// A tick that shares `in_flight` with overlapping ticks. Sessions another
/// tick is still waiting on are skipped, and replies sent before a pause or
/// resume are dropped.
pub async fn reconcile_tracked<A>(api: &A, state: &StateHandle, in_flight: &InFlight) -> usize
where
    A: TransferApi + ?Sized,
{
    let candidates = state.read(|s| {
        s.active_session_ids()
            .into_iter()
            .map(|id| (id, s.download_epoch(id)))
            .collect::<Vec<_>>()
    });
    let claim = in_flight.claim(candidates);
    if claim.claimed.is_empty() {
        return 0;
    }

    let replies = join_all(claim.claimed.iter().map(|&(session_id, epoch)| async move {
        (session_id, epoch, api.get_session(session_id).await)
    }))
    .await;

    let merged = state.update(|s| {
        let mut merged = 0;
        for (session_id, epoch, reply) in replies {
            match reply {
                Ok(info) => {
                    if s.apply_session_reply(session_id, epoch, &info) {
                        merged += 1;
                    } else {
                        debug!(session_id, "Reply not merged");
                    }
                }
                Err(e) => warn!(session_id, "Failed to get session info: {}", e),
            }
        }
        merged
    });
    drop(claim);
    merged
}

/// Keep progress current until the handle is stopped
pub fn spawn_download_poller<A>(api: Arc<A>, state: StateHandle, period: Duration) -> PollHandle
where
    A: TransferApi + ?Sized + 'static,
{
    let in_flight = InFlight::default();
    spawn_periodic("downloads", period, move || {
        let api = api.clone();
        let state = state.clone();
        let in_flight = in_flight.clone();
        async move {
            reconcile_tracked(api.as_ref(), &state, &in_flight).await;
        }
    })
}

/// Pick up sessions the node already knows about (e.g. started before this
/// client ran). Tracked sessions are left as they are.
pub async fn restore_downloads<A>(api: &A, state: &StateHandle) -> SessionResult<usize>
where
    A: FileApi + ?Sized,
{
    let records = api.get_downloads().await?;
    Ok(state.update(|s| {
        records
            .into_iter()
            .rev()
            .filter(|r| s.add_download(r.clone()).is_ok())
            .count()
    }))
}

pub async fn pause_download<A>(api: &A, state: &StateHandle, session_id: i64) -> SessionResult<()>
where
    A: TransferApi + ?Sized,
{
    expect_status(state, session_id, DownloadStatus::Downloading, "pause")?;
    api.pause(session_id).await?;
    state.update(|s| s.set_download_paused(session_id, true))
}

pub async fn resume_download<A>(api: &A, state: &StateHandle, session_id: i64) -> SessionResult<()>
where
    A: TransferApi + ?Sized,
{
    expect_status(state, session_id, DownloadStatus::Paused, "resume")?;
    api.resume(session_id).await?;
    state.update(|s| s.set_download_paused(session_id, false))
}

fn expect_status(
    state: &StateHandle,
    session_id: i64,
    expected: DownloadStatus,
    action: &'static str,
) -> SessionResult<()> {
    let status = state
        .read(|s| s.download(session_id).map(|d| d.download_status))
        .ok_or(SessionError::DownloadNotFound(session_id))?;
    if status != expected {
        return Err(SessionError::InvalidDownloadState { action, status });
    }
    Ok(())
}
