//! Wires the store, identity, backend, workers and [`App`] together.

use crate::app::App;
use crate::auth::{BypassAuth, IdentityProvider, SupabaseAuth};
use crate::remote::rest::SupabaseRest;
use crate::remote::{Disconnected, RemoteBackend};
use crate::state::app_settings::{AppSettings, AuthStrategy};
use crate::state::messages::{NetworkRequest, NetworkResponse};
use crate::state::network::NetworkWorker;
use crate::store::LocalStore;
use crate::sync::worker::{SYNC_QUEUE_CAPACITY, SyncHandle, SyncWorker};
use crate::sync::{BootstrapReport, Collection, SyncReconciler};
use chrono::Utc;
use football_data_api::client::FootballDataApi;
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

const NETWORK_QUEUE_CAPACITY: usize = 100;

pub fn identity_for(settings: &AppSettings) -> Arc<dyn IdentityProvider> {
    match (settings.auth, &settings.supabase) {
        (AuthStrategy::Supabase, Some(supabase)) => {
            Arc::new(SupabaseAuth::new(&supabase.url, &supabase.anon_key))
        }
        _ => Arc::new(BypassAuth::new()),
    }
}

pub fn remote_for(
    settings: &AppSettings,
    identity: Arc<dyn IdentityProvider>,
) -> Arc<dyn RemoteBackend> {
    match &settings.supabase {
        Some(supabase) => Arc::new(SupabaseRest::new(&supabase.url, &supabase.anon_key, identity)),
        None => {
            debug!("no backend configured, playing locally");
            Arc::new(Disconnected)
        }
    }
}

pub struct Runtime {
    pub app: Arc<Mutex<App>>,
    reconciler: Arc<SyncReconciler>,
    network_requests: Option<mpsc::Sender<NetworkRequest>>,
    network_responses: Option<mpsc::Receiver<NetworkResponse>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Open the local store under the configured data dir and start the workers.
    pub fn start(settings: AppSettings) -> Self {
        let store = Arc::new(LocalStore::open(&settings.data_dir));
        let identity = identity_for(&settings);
        let remote = remote_for(&settings, identity.clone());
        Self::with_parts(settings, store, remote, identity)
    }

    pub fn with_parts(
        settings: AppSettings,
        store: Arc<LocalStore>,
        remote: Arc<dyn RemoteBackend>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let mut tasks = Vec::new();

        let reconciler = Arc::new(SyncReconciler::new(store.clone(), remote, identity.clone()));
        let (sync_tx, sync_rx) = mpsc::channel(SYNC_QUEUE_CAPACITY);
        tasks.push(tokio::spawn(SyncWorker::new(reconciler.clone(), sync_rx).run()));

        let (network_requests, network_responses) = match settings.fixtures.clone() {
            Some(endpoint) => {
                let (req_tx, req_rx) = mpsc::channel(NETWORK_QUEUE_CAPACITY);
                let (resp_tx, resp_rx) = mpsc::channel(NETWORK_QUEUE_CAPACITY);
                let worker = NetworkWorker::new(FootballDataApi::new(endpoint), req_rx, resp_tx);
                tasks.push(tokio::spawn(worker.run()));
                (Some(req_tx), Some(resp_rx))
            }
            None => (None, None),
        };

        let app = App::new(settings, store, SyncHandle::new(sync_tx), identity);

        Self {
            app: Arc::new(Mutex::new(app)),
            reconciler,
            network_requests,
            network_responses,
            tasks,
        }
    }

    /// Run the startup sequence: cap migration, a full reconcile (awaited, so
    /// screens see merged state), then the play screen's fixture requests.
    pub async fn bootstrap(&self) -> BootstrapReport {
        {
            let mut app = self.app.lock().await;
            if let Err(e) = app.migrate_round_caps(Utc::now()) {
                error!("round cap migration failed: {e}");
            }
        }

        let report = match self.reconciler.bootstrap().await {
            Ok(report) => report,
            Err(e) => {
                warn!("bootstrap skipped: {e}");
                BootstrapReport::default()
            }
        };

        let requests = {
            let mut app = self.app.lock().await;
            app.reload_from_store();
            app.startup_requests(Utc::now())
        };
        for request in requests {
            self.send(request).await;
        }
        report
    }

    /// Push the given collections now and wait for them. Used before exiting,
    /// when queued pushes would be dropped with the sync worker.
    pub async fn flush(&self, collections: &[Collection]) {
        for &collection in collections {
            match self.reconciler.sync(collection).await {
                Ok(()) => {}
                Err(e) if e.is_not_configured() => {}
                Err(e) => warn!("pushing {collection} failed: {e}"),
            }
        }
    }

    pub async fn send(&self, request: NetworkRequest) {
        let Some(requests) = &self.network_requests else {
            return;
        };
        if let Err(e) = requests.send(request).await {
            error!("network worker is gone: {e}");
        }
    }

    /// Process fixture responses until the network worker is idle or `timeout`
    /// passes without a response.
    pub async fn settle(&mut self, timeout: Duration) {
        loop {
            let Some(responses) = self.network_responses.as_mut() else {
                return;
            };
            let received = tokio::time::timeout(timeout, responses.recv()).await;
            let response = match received {
                Ok(Some(response)) => response,
                Ok(None) => return,
                Err(_) => {
                    debug!("no network response within {timeout:?}");
                    self.send(NetworkRequest::Cancel).await;
                    return;
                }
            };
            if self.handle_network_response(response).await {
                return;
            }
        }
    }

    /// Apply one response to the app. Returns true once nothing is in flight.
    pub async fn handle_network_response(&self, response: NetworkResponse) -> bool {
        let mut app = self.app.lock().await;
        match response {
            NetworkResponse::LoadingStateChanged { loading_state } => {
                app.state.loading = loading_state;
                return !loading_state.is_loading;
            }
            NetworkResponse::FixturesLoaded { matchday, matches } => {
                if let Err(e) = app.on_fixtures_loaded(matchday, matches) {
                    error!("caching fixtures failed: {e}");
                }
                let follow_up = app.missing_form_requests();
                drop(app);
                for request in follow_up {
                    self.send(request).await;
                }
            }
            NetworkResponse::StandingsLoaded { standings } => app.on_standings_loaded(standings),
            NetworkResponse::TeamResultsLoaded { team_id, matches } => {
                app.on_team_results_loaded(team_id, matches)
            }
            NetworkResponse::Error { request, message } => match request {
                NetworkRequest::LoadFixtures { .. } => app.on_fixture_error(message),
                other => warn!("{other:?} failed: {message}"),
            },
        }
        false
    }

    pub async fn shutdown(self) {
        self.send(NetworkRequest::Cancel).await;
        for task in self.tasks {
            task.abort();
        }
    }
}
