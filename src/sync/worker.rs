use super::{Collection, SyncReconciler};
use log::{debug, error, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const SYNC_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    Bootstrap,
    Push(Collection),
}

/// Runs sync requests one at a time. Failures are logged and dropped; nothing
/// is retried.
pub struct SyncWorker {
    reconciler: Arc<SyncReconciler>,
    requests: mpsc::Receiver<SyncRequest>,
}

impl SyncWorker {
    pub fn new(reconciler: Arc<SyncReconciler>, requests: mpsc::Receiver<SyncRequest>) -> Self {
        Self { reconciler, requests }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            debug!("sync request {request:?}");
            match request {
                SyncRequest::Bootstrap => match self.reconciler.bootstrap().await {
                    Ok(report) if !report.is_complete() => {
                        warn!("bootstrap incomplete: {:?}", report.failed);
                    }
                    Ok(_) => {}
                    Err(e) => error!("bootstrap failed: {e}"),
                },
                SyncRequest::Push(collection) => {
                    match self.reconciler.sync(collection).await {
                        Ok(()) => {}
                        Err(e) if e.is_not_configured() => debug!("{collection} stays local"),
                        Err(e) => warn!("pushing {collection} failed: {e}"),
                    }
                }
            }
        }
        debug!("sync queue closed");
    }
}

/// Cloneable sender for fire-and-forget sync requests.
#[derive(Debug, Clone)]
pub struct SyncHandle {
    requests: mpsc::Sender<SyncRequest>,
}

impl SyncHandle {
    pub fn new(requests: mpsc::Sender<SyncRequest>) -> Self {
        Self { requests }
    }

    /// A handle with nothing listening. Requests are dropped.
    pub fn detached() -> Self {
        let (tx, _rx) = mpsc::channel(1);
        Self { requests: tx }
    }

    pub fn request(&self, request: SyncRequest) {
        if let Err(e) = self.requests.try_send(request) {
            warn!("dropping sync request {request:?}: {e}");
        }
    }

    pub fn push(&self, collection: Collection) {
        self.request(SyncRequest::Push(collection));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BypassAuth;
    use crate::leaderboard::LeaderboardEntry;
    use crate::remote::memory::MemoryRemote;
    use crate::store::LocalStore;

    #[tokio::test]
    async fn queued_pushes_reach_the_backend() {
        let store = Arc::new(LocalStore::in_memory());
        let remote = Arc::new(MemoryRemote::new());
        let reconciler = Arc::new(SyncReconciler::new(store.clone(), remote.clone(), Arc::new(BypassAuth::new())));
        store.save_leaderboard(&[LeaderboardEntry::you(12, 4)]).unwrap();
        store.save_profile_name("Sam").unwrap();

        let (tx, rx) = mpsc::channel(SYNC_QUEUE_CAPACITY);
        let handle = SyncHandle::new(tx);
        let worker = tokio::spawn(SyncWorker::new(reconciler, rx).run());

        handle.push(Collection::Leaderboard);
        handle.push(Collection::Profile);
        drop(handle);
        worker.await.unwrap();

        let user_id = store.load_user_id().unwrap();
        assert_eq!(remote.leaderboard_of(&user_id).and_then(|r| r.total_points), Some(12));
        assert_eq!(remote.profile_of(&user_id).and_then(|p| p.name).as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_worker() {
        let store = Arc::new(LocalStore::in_memory());
        let remote = Arc::new(MemoryRemote::new());
        remote.set_offline(true);
        let reconciler = Arc::new(SyncReconciler::new(store.clone(), remote.clone(), Arc::new(BypassAuth::new())));

        let (tx, rx) = mpsc::channel(SYNC_QUEUE_CAPACITY);
        let handle = SyncHandle::new(tx);
        let worker = tokio::spawn(SyncWorker::new(reconciler, rx).run());

        handle.request(SyncRequest::Bootstrap);
        handle.push(Collection::Rounds);
        drop(handle);
        worker.await.unwrap();
        assert!(store.load_rounds().is_empty());
    }

    #[test]
    fn detached_handle_drops_requests() {
        SyncHandle::detached().push(Collection::Predictions);
    }
}
