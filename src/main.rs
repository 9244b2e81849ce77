mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::ctrl::{CtrlOpts, TournamentCtrl};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker, SnapshotSource};
use crate::state::socket::{SocketCommand, SocketEvent, SocketWorker};
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{LevelFilter, error, info, warn};
use official_api::client::OfficialApi;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(tournament_id) = handle_cli_args() else {
        return Ok(());
    };

    better_panic::install();

    let settings = AppSettings::load(&tournament_id);
    let level = settings.log_level.unwrap_or(LevelFilter::Error);
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);

    let source = match &settings.snapshot_file {
        Some(path) => SnapshotSource::File(path.clone()),
        None => SnapshotSource::Server {
            client: OfficialApi::new(settings.server.as_str()),
            tournament_id: tournament_id.clone(),
        },
    };
    let initial = source
        .load()
        .await
        .with_context(|| format!("could not load tournament {tournament_id}"))?;
    info!("loaded {} ({})", initial.tournament.name, initial.tournament.format);

    let (ui_event_tx, ui_event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (socket_cmd_tx, socket_cmd_rx) = mpsc::unbounded_channel::<SocketCommand>();
    let (socket_evt_tx, socket_evt_rx) = mpsc::channel::<SocketEvent>(100);

    let ctrl = build_ctrl(&settings, initial, socket_cmd_tx, ui_event_tx.clone());
    let socket_url = settings.socket_url();
    let app = Arc::new(Mutex::new(App::new(settings, ctrl)));

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(source, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Socket thread
    let socket_worker = SocketWorker {
        url: socket_url,
        commands: socket_cmd_rx,
        events: socket_evt_tx,
    };
    let socket_task = tokio::spawn(socket_worker.run());

    // First frame
    let _ = ui_event_tx.send(UiEvent::Redraw);

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx, socket_evt_rx).await;

    input_handler.abort();
    network_task.abort();
    socket_task.abort();

    Ok(())
}

/// Wire the controller's outbound capabilities to the worker channels.
fn build_ctrl(
    settings: &AppSettings,
    data: official_api::Snapshot,
    socket_commands: mpsc::UnboundedSender<SocketCommand>,
    ui_events: mpsc::UnboundedSender<UiEvent>,
) -> TournamentCtrl {
    let redraw_tx = ui_events.clone();
    let navigate_tx = ui_events;

    TournamentCtrl::new(
        CtrlOpts {
            data,
            user_id: settings.user_id.clone(),
            socket_send: Box::new(move |intent| {
                if socket_commands.send(SocketCommand::Send(intent)).is_err() {
                    warn!("socket worker is gone, dropping {}", intent.kind());
                }
            }),
        },
        Box::new(move || {
            let _ = redraw_tx.send(UiEvent::Redraw);
        }),
        Box::new(move |destination| {
            let _ = navigate_tx.send(UiEvent::Navigate(destination.clone()));
        }),
    )
}

/// Returns the tournament id to open, or `None` when the process should exit.
fn handle_cli_args() -> Option<String> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        eprintln!("Missing tournament id\n\n{}", usage_text());
        std::process::exit(2);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("official-tui {}", env!("CARGO_PKG_VERSION"));
            None
        }
        id if !id.starts_with('-') && args.next().is_none() => Some(id.to_string()),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "official-tui - follow a live tournament in the terminal

Usage:
  official-tui <tournament-id>
  official-tui --help
  official-tui --version

Environment:
  OFFICIAL_SERVER         Tournament server base URL (default http://127.0.0.1:8788)
  OFFICIAL_USER           Your user id, for joining and highlighting your matches
  OFFICIAL_SNAPSHOT_JSON  Path to a local tournament JSON snapshot
  OFFICIAL_LOG            Log level: error, warn, info, debug, trace (default error)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::UnboundedReceiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    mut socket_events: mpsc::Receiver<SocketEvent>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(socket_event) = socket_events.recv() => {
                let should_redraw = handle_socket_event(socket_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize | UiEvent::Redraw => true,
        UiEvent::Navigate(destination) => {
            app.lock().await.on_navigate(&destination);
            true
        }
    }
}

async fn handle_socket_event(
    event: SocketEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    let mut guard = app.lock().await;
    match event {
        SocketEvent::Connected => {
            if guard.on_socket_connected() {
                // Reloads pushed while we were away are gone; catch up over HTTP.
                drop(guard);
                let _ = network_requests.send(NetworkRequest::LoadSnapshot).await;
            }
            true
        }
        SocketEvent::Disconnected => {
            guard.on_socket_disconnected();
            true
        }
        SocketEvent::Push { kind, payload } => guard.on_push(&kind, payload),
        SocketEvent::Error(message) => {
            guard.on_socket_error(message);
            false
        }
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::SnapshotLoaded { snapshot } => {
            let mut guard = app.lock().await;
            guard.on_snapshot_loaded(*snapshot);
            // The controller has queued its own redraw.
            return false;
        }
        NetworkResponse::Error { message } => {
            error!("Network error: {message}");
            let mut guard = app.lock().await;
            guard.on_error(message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::UnboundedSender<UiEvent>) {
    loop {
        // crossterm's read blocks; keep it off the async workers.
        let Ok(Ok(event)) = tokio::task::spawn_blocking(crossterm_event::read).await else {
            continue;
        };
        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).is_err()
        {
            break;
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide).unwrap();
    execute!(stdout, terminal::EnterAlternateScreen).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    terminal::enable_raw_mode().unwrap();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0)).unwrap();
    execute!(stdout, terminal::Clear(terminal::ClearType::All)).unwrap();
    execute!(stdout, terminal::LeaveAlternateScreen).unwrap();
    execute!(stdout, cursor::Show).unwrap();
    terminal::disable_raw_mode().unwrap();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
