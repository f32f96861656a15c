//! Ratatui console for team tracking.
//!
//! One screen, gated by the admin key: Loading → Setup | Challenge →
//! Authenticated. Backend calls run on worker threads and come back as
//! [`AppEvent::Reply`].

pub mod event;
pub mod screens;
pub mod theme;

use crate::config::Config;
use crate::gate::{AdminGate, Notice, NoticeLevel, Reply};
use crate::session::SessionCache;
use event::AppEvent;
use screens::admin::{self, AdminAction};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use teamtrack_client::AdminBackend;
use tracing::{info, warn};

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

/// Ticks a toast stays on screen (~3s at 50ms).
const TOAST_TICKS: usize = 60;

/// A notice being shown at the bottom of the screen.
struct Toast {
    notice: Notice,
    expires_at: usize,
}

impl Toast {
    fn new(notice: Notice, now: usize) -> Self {
        Self {
            notice,
            expires_at: now.wrapping_add(TOAST_TICKS),
        }
    }

    fn is_expired(&self, now: usize) -> bool {
        now >= self.expires_at
    }

    fn color(&self) -> Color {
        match self.notice.level {
            NoticeLevel::Success => theme::GREEN,
            NoticeLevel::Error => theme::RED,
            NoticeLevel::Info => theme::CYAN,
            NoticeLevel::Warning => theme::YELLOW,
        }
    }

    fn glyph(&self) -> &'static str {
        match self.notice.level {
            NoticeLevel::Success => "\u{2714}",
            NoticeLevel::Error => "\u{2718}",
            NoticeLevel::Info => "\u{2139}",
            NoticeLevel::Warning => "\u{26a0}",
        }
    }
}

struct App {
    admin: admin::AdminScreen,
    backend: Arc<dyn AdminBackend>,
    backend_label: String,
    event_tx: mpsc::Sender<AppEvent>,
    should_quit: bool,
    /// Double Ctrl+C quit: true after first Ctrl+C press.
    ctrl_c_pending: bool,
    /// Tick counter when first Ctrl+C was pressed (auto-resets after ~2s).
    ctrl_c_tick: usize,
    tick_count: usize,
    toast: Option<Toast>,
}

// ─── App construction ────────────────────────────────────────────────────────

impl App {
    fn new(
        config: &Config,
        backend: Arc<dyn AdminBackend>,
        cache: SessionCache,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            admin: admin::AdminScreen::new(AdminGate::new(cache), config.tracker_url.clone()),
            backend,
            backend_label: config.backend_url.clone(),
            event_tx,
            should_quit: false,
            ctrl_c_pending: false,
            ctrl_c_tick: 0,
            tick_count: 0,
            toast: None,
        }
    }

    /// Kick off the mount-time existence probe.
    fn mount(&mut self) {
        if let Some(request) = self.admin.gate.mount() {
            event::spawn_request(self.backend.clone(), request, self.event_tx.clone());
        }
    }

    // ─── Event dispatch ──────────────────────────────────────────────────────

    fn handle_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => self.handle_tick(),
            AppEvent::Reply(reply) => self.handle_reply(reply),
        }
        self.collect_notices();
    }

    fn handle_key(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        use ratatui::crossterm::event::{KeyCode, KeyModifiers};

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.ctrl_c_pending {
                self.should_quit = true;
            } else {
                self.ctrl_c_pending = true;
                self.ctrl_c_tick = self.tick_count;
            }
            return;
        }
        self.ctrl_c_pending = false;

        match self.admin.handle_key(key) {
            AdminAction::Continue => {}
            AdminAction::Dispatch(request) => {
                event::spawn_request(self.backend.clone(), request, self.event_tx.clone());
            }
            AdminAction::OpenLink(url) => self.open_link(&url),
        }
    }

    fn handle_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        // Auto-reset Ctrl+C pending after ~2s (40 ticks at 50ms)
        if self.ctrl_c_pending && self.tick_count.wrapping_sub(self.ctrl_c_tick) > 40 {
            self.ctrl_c_pending = false;
        }
        if self
            .toast
            .as_ref()
            .is_some_and(|t| t.is_expired(self.tick_count))
        {
            self.toast = None;
        }
        self.admin.tick();
    }

    fn handle_reply(&mut self, reply: Reply) {
        let is_search = matches!(reply, Reply::Search { .. });
        if let Some(follow_up) = self.admin.gate.on_reply(reply) {
            event::spawn_request(self.backend.clone(), follow_up, self.event_tx.clone());
        }
        if is_search {
            self.admin.on_result_changed();
        }
    }

    fn open_link(&mut self, url: &str) {
        info!(url, "Opening issue in browser");
        if let Err(e) = webbrowser::open(url) {
            warn!(url, error = %e, "Could not open browser");
            self.admin
                .gate
                .notify(NoticeLevel::Error, "Ba\u{011f}lant\u{0131} a\u{00e7}\u{0131}lamad\u{0131}");
        }
    }

    /// Move gate notices into the toast slot; the newest one wins.
    fn collect_notices(&mut self) {
        if let Some(notice) = self.admin.gate.take_notices().pop() {
            self.toast = Some(Toast::new(notice, self.tick_count));
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1), // status bar
            Constraint::Min(1),    // content
        ])
        .split(area);

        self.draw_status_bar(frame, chunks[0]);
        admin::draw(frame, chunks[1], &mut self.admin);

        if let Some(toast) = &self.toast {
            let msg = format!(" {} {}", toast.glyph(), toast.notice.text);
            render_toast(frame, area, &msg, toast.color());
        }
    }

    fn draw_status_bar(&self, frame: &mut ratatui::Frame, area: Rect) {
        let width = area.width as usize;
        let hint = if self.ctrl_c_pending {
            "Press Ctrl+C again to quit"
        } else {
            "Ctrl+C\u{00d7}2 quit"
        };
        let hint_style = if self.ctrl_c_pending {
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::hint_style()
        };

        let mut spans = vec![
            Span::styled(" teamtrack ", theme::title_style()),
            Span::styled(format!(" {}", self.backend_label), theme::dim_style()),
        ];
        let spans_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let padding = width.saturating_sub(spans_width + hint.chars().count() + 1);
        if padding > 0 {
            spans.push(Span::raw(" ".repeat(padding)));
            spans.push(Span::styled(hint, hint_style));
        }

        let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_CARD));
        frame.render_widget(bar, area);
    }
}

/// Draw a one-line toast at the bottom of the screen.
fn render_toast(frame: &mut ratatui::Frame, area: Rect, msg: &str, color: Color) {
    let w = (msg.chars().count() as u16 + 4).min(area.width);
    let x = area.width.saturating_sub(w) / 2;
    let y = area.height.saturating_sub(2);
    let toast_area = Rect::new(x, y, w, 1);
    let para = Paragraph::new(Line::from(vec![Span::styled(
        msg,
        Style::default().fg(color).bg(theme::BG_CARD),
    )]));
    frame.render_widget(para, toast_area);
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Entry point for the interactive console.
pub fn run(
    config: &Config,
    backend: Arc<dyn AdminBackend>,
    cache: SessionCache,
) -> std::io::Result<()> {
    // Panic hook: always restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        original_hook(info);
    }));

    let mut terminal = ratatui::init();

    // 50ms tick → 20fps spinner animation, snappy key response
    let (tx, rx) = event::spawn_event_thread(Duration::from_millis(50));
    let mut app = App::new(config, backend, cache, tx);
    app.mount();

    // Draw first, then block on events so the first frame appears
    // before any event processing.
    let result: std::io::Result<()> = (|| {
        while !app.should_quit {
            terminal.draw(|frame| app.draw(frame))?;

            match rx.recv_timeout(Duration::from_millis(33)) {
                Ok(ev) => app.handle_event(ev),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
            // Drain all queued events immediately (batch processing)
            while let Ok(ev) = rx.try_recv() {
                app.handle_event(ev);
            }
        }
        Ok(())
    })();

    ratatui::restore();
    info!("Console closed");
    result
}
