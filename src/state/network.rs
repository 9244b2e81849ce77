use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use official_api::client::{ApiError, OfficialApi, load_snapshot_file};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Where snapshots come from: the server, or a JSON file for offline viewing.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Server { client: OfficialApi, tournament_id: String },
    File(PathBuf),
}

impl SnapshotSource {
    pub async fn load(&self) -> Result<official_api::Snapshot, ApiError> {
        match self {
            SnapshotSource::Server { client, tournament_id } => {
                client.fetch_snapshot(tournament_id).await
            }
            SnapshotSource::File(path) => load_snapshot_file(path),
        }
    }
}

pub struct NetworkWorker {
    source: SnapshotSource,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        source: SnapshotSource,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            source,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = match request {
                NetworkRequest::LoadSnapshot => self.handle_load_snapshot().await,
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_load_snapshot(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading tournament snapshot");
        let snapshot = self.source.load().await?;
        Ok(NetworkResponse::SnapshotLoaded { snapshot: Box::new(snapshot) })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn snapshot_json() -> String {
        serde_json::json!({
            "tournament": {
                "id": "t9",
                "name": "Night Owl Swiss",
                "tournamentType": "swiss",
                "status": "started",
                "nbPlayers": 12,
                "startsAt": 1_760_000_000_000i64,
                "clock": { "limit": 180, "increment": 0 },
                "variant": "standard",
                "rated": true
            }
        })
        .to_string()
    }

    async fn collect_until_done(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await {
                Some(NetworkResponse::LoadingStateChanged { .. }) => continue,
                Some(other) => return other,
                None => panic!("worker hung up"),
            }
        }
    }

    #[tokio::test]
    async fn file_source_loads_a_snapshot() {
        let path = std::env::temp_dir().join(format!("official-tui-{}.json", std::process::id()));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(snapshot_json().as_bytes())
            .unwrap();

        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(SnapshotSource::File(path.clone()), req_rx, resp_tx).run());
        req_tx.send(NetworkRequest::LoadSnapshot).await.unwrap();

        match collect_until_done(&mut resp_rx).await {
            NetworkResponse::SnapshotLoaded { snapshot } => assert_eq!(snapshot.tournament.id, "t9"),
            other => panic!("expected snapshot, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn server_errors_become_error_responses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/official/gone").with_status(404).create_async().await;

        let source = SnapshotSource::Server {
            client: OfficialApi::new(server.url()),
            tournament_id: "gone".into(),
        };
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(source, req_rx, resp_tx).run());
        req_tx.send(NetworkRequest::LoadSnapshot).await.unwrap();

        match collect_until_done(&mut resp_rx).await {
            NetworkResponse::Error { message } => assert!(message.contains("gone"), "{message}"),
            other => panic!("expected error, got {other:?}"),
        }
        mock.assert_async().await;
    }
}
