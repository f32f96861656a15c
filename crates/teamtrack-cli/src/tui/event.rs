//! Event system: crossterm polling, tick timer, backend worker threads.

use crate::gate::{Reply, Request};
use ratatui::crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use teamtrack_client::AdminBackend;
use tracing::debug;

// ── AppEvent ────────────────────────────────────────────────────────────────

/// Unified application event.
pub enum AppEvent {
    /// A crossterm key press event (filtered to Press only).
    Key(KeyEvent),
    /// Periodic tick for spinners and toast expiry.
    Tick,
    /// A backend call finished.
    Reply(Reply),
}

/// Spawn the crossterm polling + tick thread. Returns sender + receiver.
pub fn spawn_event_thread(
    tick_rate: Duration,
) -> (mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
    let (tx, rx) = mpsc::channel();
    let poll_tx = tx.clone();

    std::thread::spawn(move || loop {
        if event::poll(tick_rate).unwrap_or(false) {
            if let Ok(ev) = event::read() {
                let sent = match ev {
                    // Windows also reports Release and Repeat; forwarding
                    // them would double every keystroke.
                    CtEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        poll_tx.send(AppEvent::Key(key))
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        } else if poll_tx.send(AppEvent::Tick).is_err() {
            break;
        }
    });

    (tx, rx)
}

/// Run one gate request on a worker thread and post the reply back.
pub fn spawn_request(
    backend: Arc<dyn AdminBackend>,
    request: Request,
    tx: mpsc::Sender<AppEvent>,
) {
    debug!(?request, "Dispatching backend request");
    std::thread::spawn(move || {
        let reply = run_request(backend.as_ref(), request);
        // The receiver is gone only when the UI has exited.
        let _ = tx.send(AppEvent::Reply(reply));
    });
}

/// Execute a request synchronously.
pub fn run_request(backend: &dyn AdminBackend, request: Request) -> Reply {
    match request {
        Request::Probe { op } => Reply::Probe {
            op,
            result: backend.key_exists(),
        },
        Request::Verify { op, admin_key } => Reply::Verify {
            op,
            result: backend.verify_key(&admin_key),
        },
        Request::Setup { op, admin_key } => Reply::Setup {
            op,
            result: backend.setup_key(&admin_key),
        },
        Request::Search {
            op,
            username,
            admin_key,
        } => Reply::Search {
            op,
            result: backend.team_tasks(&username, &admin_key),
        },
    }
}
