use crate::state::messages::{NetworkRequest, NetworkResponse};
use football_data_api::client::{ApiError, ApiResult, FootballDataApi};
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub is_loading: bool,
    /// Requests still running when this state was sent.
    pub in_flight: usize,
}

/// Serves fixture requests. Each request runs as its own task so a `Cancel`
/// can abort whatever the screen no longer needs.
pub struct NetworkWorker {
    client: FootballDataApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    in_flight: Arc<AtomicUsize>,
    tasks: Vec<JoinHandle<()>>,
}

impl NetworkWorker {
    pub fn new(
        client: FootballDataApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            in_flight: Arc::new(AtomicUsize::new(0)),
            tasks: Vec::new(),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.tasks.retain(|task| !task.is_finished());

            if request == NetworkRequest::Cancel {
                self.cancel_all().await;
                continue;
            }

            let client = self.client.clone();
            let responses = self.responses.clone();
            let in_flight = self.in_flight.clone();
            let count = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            send_loading(&responses, count).await;

            self.tasks.push(tokio::spawn(async move {
                let response = handle(&client, request.clone())
                    .await
                    .unwrap_or_else(|err| NetworkResponse::Error { request, message: err.to_string() });
                debug!("network request complete");

                let sent = responses.send(response).await;
                let remaining = in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
                if let Err(e) = sent {
                    error!("Failed to send network response: {e}");
                    return;
                }
                send_loading(&responses, remaining).await;
            }));
        }
        self.cancel_all().await;
    }

    async fn cancel_all(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        debug!("cancelling {} fixture request(s)", self.tasks.len());
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.in_flight.store(0, Ordering::SeqCst);
        send_loading(&self.responses, 0).await;
    }
}

async fn handle(client: &FootballDataApi, request: NetworkRequest) -> ApiResult<NetworkResponse> {
    match request {
        NetworkRequest::LoadFixtures { competition, matchday } => {
            debug!("loading {competition} matchday {matchday}");
            let matches = client.fetch_matchday(&competition, matchday).await?;
            Ok(NetworkResponse::FixturesLoaded { matchday, matches })
        }
        NetworkRequest::LoadStandings { competition, season } => {
            debug!("loading {competition} standings for {season}");
            let standings = client.fetch_standings(&competition, season).await?;
            Ok(NetworkResponse::StandingsLoaded { standings })
        }
        NetworkRequest::LoadTeamResults { team_id, limit } => {
            debug!("loading last {limit} results for team {team_id}");
            let matches = client.fetch_team_results(&team_id, limit).await?;
            Ok(NetworkResponse::TeamResultsLoaded { team_id, matches })
        }
        NetworkRequest::Cancel => Err(ApiError::Other("cancel is not a fetch".into())),
    }
}

async fn send_loading(responses: &mpsc::Sender<NetworkResponse>, in_flight: usize) {
    let loading_state = LoadingState { is_loading: in_flight > 0, in_flight };
    let _ = responses.send(NetworkResponse::LoadingStateChanged { loading_state }).await;
}
