use crate::app::{App, MenuItem};
use crate::components::actions::Action;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Tournament),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Bracket cursor, or standings scroll
        (MenuItem::Tournament, Char('l') | KeyCode::Right, _) => guard.move_right(),
        (MenuItem::Tournament, Char('h') | KeyCode::Left, _) => guard.move_left(),
        (MenuItem::Tournament, Char('j') | KeyCode::Down, _) => guard.move_down(),
        (MenuItem::Tournament, Char('k') | KeyCode::Up, _) => guard.move_up(),
        (MenuItem::Tournament, KeyCode::Enter, _) => {
            guard.open_selected_game();
        }

        // Intents
        (MenuItem::Tournament, Char('J'), _) => {
            guard.perform_action(Action::Join);
        }
        (MenuItem::Tournament, Char('W'), _) => {
            guard.perform_action(Action::Withdraw);
        }
        (_, Char('R'), _) => {
            drop(guard);
            let _ = network_requests.send(NetworkRequest::LoadSnapshot).await;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }
}
