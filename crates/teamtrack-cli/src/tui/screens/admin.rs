//! Team tracking screen: setup, challenge and search behind the admin gate.

use crate::gate::{AdminGate, InputEdit, NoticeLevel, Presentation, Request, View};
use crate::tui::theme;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, TableState};
use ratatui::Frame;
use teamtrack_types::tasks::{SearchResult, Task, TeamTasks};

const LINK_MARKER: &str = " \u{2197}";
const TITLE_MAX: usize = 72;

// ── State ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PanelFocus {
    Input,
    Results,
}

pub struct AdminScreen {
    pub gate: AdminGate,
    pub focus: PanelFocus,
    pub table_state: TableState,
    pub tracker_url: String,
    pub tick: usize,
}

#[derive(Debug)]
pub enum AdminAction {
    Continue,
    Dispatch(Request),
    OpenLink(String),
}

impl AdminScreen {
    pub fn new(gate: AdminGate, tracker_url: impl Into<String>) -> Self {
        Self {
            gate,
            focus: PanelFocus::Input,
            table_state: TableState::default(),
            tracker_url: tracker_url.into(),
            tick: 0,
        }
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Re-sync table selection after the displayed result changed.
    pub fn on_result_changed(&mut self) {
        let has_rows = self
            .gate
            .result()
            .is_some_and(|r| !r.tasks().is_empty());
        self.table_state
            .select(if has_rows { Some(0) } else { None });
        if !has_rows {
            self.focus = PanelFocus::Input;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AdminAction {
        match self.gate.presentation() {
            Presentation::Loading => AdminAction::Continue,
            Presentation::Setup => self.handle_form_key(key),
            Presentation::Challenge => self.handle_form_key(key),
            Presentation::Authenticated => self.handle_search_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> AdminAction {
        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Tab | KeyCode::Down => self.gate.edit(InputEdit::NextField),
            KeyCode::BackTab | KeyCode::Up => self.gate.edit(InputEdit::PrevField),
            KeyCode::Backspace => self.gate.edit(InputEdit::Backspace),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.gate.edit(InputEdit::Char(c))
            }
            _ => {}
        }
        AdminAction::Continue
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> AdminAction {
        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.gate.logout();
            self.focus = PanelFocus::Input;
            self.table_state.select(None);
            return AdminAction::Continue;
        }

        if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
            let has_rows = self.rows() > 0;
            self.focus = match self.focus {
                PanelFocus::Input if has_rows => PanelFocus::Results,
                _ => PanelFocus::Input,
            };
            return AdminAction::Continue;
        }

        match self.focus {
            PanelFocus::Input => match key.code {
                KeyCode::Enter => return self.submit(),
                KeyCode::Backspace => self.gate.edit(InputEdit::Backspace),
                KeyCode::Down if self.rows() > 0 => self.focus = PanelFocus::Results,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.gate.edit(InputEdit::Char(c))
                }
                _ => {}
            },
            PanelFocus::Results => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    let rows = self.rows();
                    if rows > 0 {
                        let i = self.table_state.selected().unwrap_or(0);
                        let prev = if i == 0 { rows - 1 } else { i - 1 };
                        self.table_state.select(Some(prev));
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let rows = self.rows();
                    if rows > 0 {
                        let i = self.table_state.selected().unwrap_or(0);
                        self.table_state.select(Some((i + 1) % rows));
                    }
                }
                KeyCode::Enter | KeyCode::Char('o') => return self.open_selected(),
                KeyCode::Esc => self.focus = PanelFocus::Input,
                _ => {}
            },
        }
        AdminAction::Continue
    }

    fn submit(&mut self) -> AdminAction {
        match self.gate.submit() {
            Some(request) => AdminAction::Dispatch(request),
            None => AdminAction::Continue,
        }
    }

    fn rows(&self) -> usize {
        self.gate.result().map_or(0, |r| r.tasks().len())
    }

    fn selected_task(&self) -> Option<&Task> {
        let idx = self.table_state.selected()?;
        self.gate.result()?.tasks().get(idx)
    }

    fn open_selected(&mut self) -> AdminAction {
        let Some(task) = self.selected_task() else {
            return AdminAction::Continue;
        };
        match task.issue_link(&self.tracker_url) {
            Some(url) => AdminAction::OpenLink(url),
            None => {
                self.gate
                    .notify(NoticeLevel::Warning, "Bu görevin Jira bağlantısı yok");
                AdminAction::Continue
            }
        }
    }
}

// ── Drawing ─────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, area: Rect, state: &mut AdminScreen) {
    let title = match state.gate.presentation() {
        Presentation::Setup => " \u{0130}lk Kurulum ",
        _ => " Ekip Takibi ",
    };
    let block = Block::default()
        .title(Line::from(vec![Span::styled(title, theme::title_style())]))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .padding(Padding::horizontal(1));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let spinner = theme::SPINNER_FRAMES[state.tick % theme::SPINNER_FRAMES.len()];
    let verifying = state.gate.is_verifying();
    match state.gate.view() {
        View::Loading => {
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("  {spinner} "), Style::default().fg(theme::CYAN)),
                    Span::styled("Y\u{00fc}kleniyor\u{2026}", theme::dim_style()),
                ])),
                inner,
            );
        }
        View::Setup(form) => {
            let fields = [
                ("Yeni admin anahtar\u{0131} (en az 6 karakter):", form.new_key.as_str()),
                ("Anahtar\u{0131} tekrar girin:", form.confirm_key.as_str()),
            ];
            let hint = if verifying {
                format!("  {spinner} Kaydediliyor\u{2026}")
            } else {
                "  [Tab] alan  [Enter] Kaydet  [Ctrl+C\u{00d7}2] \u{00e7}\u{0131}k".to_string()
            };
            draw_key_form(
                f,
                inner,
                "Ekip takibi i\u{00e7}in bir admin anahtar\u{0131} belirleyin.",
                &fields,
                Some(form.field),
                &hint,
            );
        }
        View::Challenge(form) => {
            let fields = [("Admin anahtar\u{0131}:", form.key.as_str())];
            let hint = if verifying {
                format!("  {spinner} Do\u{011f}rulan\u{0131}yor\u{2026}")
            } else {
                "  [Enter] Giri\u{015f} Yap  [Ctrl+C\u{00d7}2] \u{00e7}\u{0131}k".to_string()
            };
            draw_key_form(
                f,
                inner,
                "Devam etmek i\u{00e7}in admin anahtar\u{0131}n\u{0131} girin.",
                &fields,
                Some(0),
                &hint,
            );
        }
        View::Authenticated(_) => draw_search(f, inner, state),
    }
}

fn draw_key_form(
    f: &mut Frame,
    area: Rect,
    intro: &str,
    fields: &[(&str, &str)],
    focused: Option<usize>,
    hint: &str,
) {
    let mut constraints = vec![Constraint::Length(2)];
    for _ in fields {
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(2));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(area);

    f.render_widget(
        Paragraph::new(Span::styled(intro, Style::default().fg(theme::TEXT))),
        rows[0],
    );
    for (i, (label, value)) in fields.iter().enumerate() {
        let is_focused = focused == Some(i);
        f.render_widget(
            Paragraph::new(Span::styled(*label, theme::input_style(is_focused))),
            rows[1 + i * 2],
        );
        let cursor = if is_focused { "\u{2588}" } else { "" };
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("  {}{cursor}", mask(value)),
                Style::default().fg(theme::TEXT),
            )),
            rows[2 + i * 2],
        );
    }
    f.render_widget(
        Paragraph::new(Span::styled(hint, theme::hint_style())),
        rows[1 + fields.len() * 2],
    );
}

fn draw_search(f: &mut Frame, area: Rect, state: &mut AdminScreen) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // label
        Constraint::Length(1), // input
        Constraint::Length(1), // separator
        Constraint::Min(3),    // results
        Constraint::Length(1), // hints
    ])
    .split(area);

    let input_focused = state.focus == PanelFocus::Input;
    let View::Authenticated(panel) = state.gate.view() else {
        return;
    };

    f.render_widget(
        Paragraph::new(Span::styled(
            "Kullan\u{0131}c\u{0131} ad\u{0131} (\u{00f6}rn: sercano)",
            theme::input_style(input_focused),
        )),
        chunks[0],
    );
    let cursor = if input_focused { "\u{2588}" } else { "" };
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("  {}{cursor}", panel.username),
            Style::default().fg(theme::TEXT),
        )),
        chunks[1],
    );
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "\u{2500}".repeat(area.width as usize),
            theme::dim_style(),
        ))),
        chunks[2],
    );

    let hint = if state.gate.is_searching() {
        let spinner = theme::SPINNER_FRAMES[state.tick % theme::SPINNER_FRAMES.len()];
        format!("  {spinner} Aran\u{0131}yor\u{2026}")
    } else if input_focused {
        "  [Enter] Ara  [Tab] sonu\u{00e7}lar  [Ctrl+L] \u{00c7}\u{0131}k\u{0131}\u{015f}".to_string()
    } else {
        "  [\u{2191}\u{2193}] se\u{00e7}  [o] Jira'da a\u{00e7}  [Tab] arama  [Ctrl+L] \u{00c7}\u{0131}k\u{0131}\u{015f}"
            .to_string()
    };
    f.render_widget(
        Paragraph::new(Span::styled(hint, theme::hint_style())),
        chunks[4],
    );

    match panel.result.as_ref() {
        None => {}
        Some(SearchResult::NotFound { message }) => {
            f.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("  \u{26a0} ", Style::default().fg(theme::YELLOW)),
                    Span::styled(
                        message.as_str(),
                        Style::default()
                            .fg(theme::YELLOW)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])),
                chunks[3],
            );
        }
        Some(SearchResult::Found(found)) if found.tasks.is_empty() => {
            draw_empty_state(f, chunks[3], found);
        }
        Some(SearchResult::Found(found)) => {
            draw_task_table(
                f,
                chunks[3],
                found,
                !input_focused,
                &mut state.table_state,
            );
        }
    }
}

fn summary_line(found: &TeamTasks) -> Line<'_> {
    Line::from(vec![
        Span::styled(
            format!("  {}", found.user.name),
            Style::default()
                .fg(theme::CYAN)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  Toplam {}  \u{00b7}  Devam eden {}  \u{00b7}  Bekleyen {}",
                found.summary.total, found.summary.in_progress, found.summary.backlog
            ),
            theme::dim_style(),
        ),
    ])
}

fn draw_empty_state(f: &mut Frame, area: Rect, found: &TeamTasks) {
    let panel = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::dim_style())
        .padding(Padding::uniform(1));
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);
    f.render_widget(Paragraph::new(summary_line(found)), chunks[0]);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("\u{2714} ", Style::default().fg(theme::GREEN)),
            Span::styled(
                "Bu kullan\u{0131}c\u{0131}n\u{0131}n a\u{00e7}\u{0131}k g\u{00f6}revi yok",
                Style::default().fg(theme::TEXT),
            ),
        ]))
        .block(panel),
        chunks[1],
    );
}

fn draw_task_table(
    f: &mut Frame,
    area: Rect,
    found: &TeamTasks,
    focused: bool,
    table_state: &mut TableState,
) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Min(2)]).split(area);
    f.render_widget(Paragraph::new(summary_line(found)), chunks[0]);

    let header = Row::new(vec![
        Cell::from("G\u{00f6}rev"),
        Cell::from("Durum"),
        Cell::from("\u{00d6}ncelik"),
    ])
    .style(
        Style::default()
            .fg(theme::TEXT_SECONDARY)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = found.tasks.iter().map(task_row).collect();

    let highlight = if focused {
        theme::selected_style()
    } else {
        Style::default()
    };
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(60),
            Constraint::Percentage(25),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .row_highlight_style(highlight)
    .highlight_symbol("> ");
    f.render_stateful_widget(table, chunks[1], table_state);
}

fn task_row(task: &Task) -> Row<'_> {
    let mut title = vec![Span::styled(
        truncate(&task.title, TITLE_MAX),
        Style::default().fg(theme::TEXT),
    )];
    if let Some(key) = task.issue_key() {
        title.push(Span::styled(
            format!("{LINK_MARKER} {key}"),
            Style::default().fg(theme::CYAN),
        ));
    }
    Row::new(vec![
        Cell::from(Line::from(title)),
        Cell::from(Span::styled(
            task.status_label().to_string(),
            theme::status_style(task.status.as_str()),
        )),
        Cell::from(Span::styled(
            task.priority.label().to_string(),
            theme::priority_style(task.priority.as_str()),
        )),
    ])
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn mask(value: &str) -> String {
    "\u{2022}".repeat(value.chars().count())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!(
            "{}\u{2026}",
            teamtrack_types::truncate_str(s, max.saturating_sub(1))
        )
    }
}
