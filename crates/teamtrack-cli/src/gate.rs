//! Admin gate: the three-state authentication machine behind the console.
//!
//! ```text
//!   Loading ──probe(exists=false)──────────────▶ Setup ──setup ok──┐
//!      │                                                           ▼
//!      ├──probe(exists=true), cached key verifies ─────────▶ Authenticated
//!      │                                                     ▲      │
//!      └──otherwise──▶ Challenge ──verify(valid=true)────────┘      │
//!                          ▲                                         │
//!                          └──────── logout / 401 / 403 ─────────────┘
//! ```
//!
//! The gate performs no I/O. Operator input and backend replies go in;
//! [`Request`]s to run against the backend and [`Notice`]s to show come out.
//! Every request carries an operation id and a reply is applied only if it
//! answers the one outstanding request.

use crate::session::SessionCache;
use teamtrack_client::ClientResult;
use teamtrack_types::admin::{KeyStatus, SetupResponse, VerifyResponse, MIN_ADMIN_KEY_LEN};
use teamtrack_types::tasks::{SearchQuery, SearchResult};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

// ── Operator-facing messages ────────────────────────────────────────────────

pub const MSG_KEY_TOO_SHORT: &str = "Anahtar en az 6 karakter olmalı";
pub const MSG_KEY_MISMATCH: &str = "Anahtarlar eşleşmiyor";
pub const MSG_SETUP_OK: &str = "Admin anahtarı oluşturuldu";
pub const MSG_SETUP_FAILED: &str = "Kurulum başarısız";
pub const MSG_KEY_EMPTY: &str = "Anahtar girin";
pub const MSG_LOGIN_OK: &str = "Giriş başarılı";
pub const MSG_INVALID_KEY: &str = "Geçersiz anahtar";
pub const MSG_VERIFY_FAILED: &str = "Doğrulama başarısız";
pub const MSG_LOGGED_OUT: &str = "Çıkış yapıldı";
pub const MSG_USERNAME_EMPTY: &str = "Kullanıcı adı girin";
pub const MSG_ACCESS_DENIED: &str = "Erişim reddedildi";
pub const MSG_SEARCH_FAILED: &str = "Arama başarısız";

// ── Types ───────────────────────────────────────────────────────────────────

/// Which of the four presentations the gate is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Loading,
    Setup,
    Challenge,
    Authenticated,
}

/// Current presentation with its form state.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Loading,
    Setup(SetupForm),
    Challenge(ChallengeForm),
    Authenticated(SearchPanel),
}

/// First-time provisioning form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub new_key: String,
    pub confirm_key: String,
    /// 0 = new key, 1 = confirmation.
    pub field: usize,
}

/// Credential challenge form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeForm {
    pub key: String,
}

/// Search input plus the most recent completed search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPanel {
    pub username: String,
    pub result: Option<SearchResult>,
}

/// Text editing applied to the focused input of the current form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdit {
    Char(char),
    Backspace,
    NextField,
    PrevField,
}

/// Severity of an operator notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
    Warning,
}

/// A short transient message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Work the gate wants run against the backend.
pub enum Request {
    Probe {
        op: u64,
    },
    Verify {
        op: u64,
        admin_key: Zeroizing<String>,
    },
    Setup {
        op: u64,
        admin_key: Zeroizing<String>,
    },
    Search {
        op: u64,
        username: String,
        admin_key: Zeroizing<String>,
    },
}

impl Request {
    pub fn op(&self) -> u64 {
        match self {
            Request::Probe { op }
            | Request::Verify { op, .. }
            | Request::Setup { op, .. }
            | Request::Search { op, .. } => *op,
        }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Probe { op } => write!(f, "Probe#{op}"),
            Request::Verify { op, .. } => write!(f, "Verify#{op}"),
            Request::Setup { op, .. } => write!(f, "Setup#{op}"),
            Request::Search { op, username, .. } => write!(f, "Search#{op}({username})"),
        }
    }
}

/// A backend answer, tagged with the operation it belongs to.
#[derive(Debug)]
pub enum Reply {
    Probe {
        op: u64,
        result: ClientResult<KeyStatus>,
    },
    Verify {
        op: u64,
        result: ClientResult<VerifyResponse>,
    },
    Setup {
        op: u64,
        result: ClientResult<SetupResponse>,
    },
    Search {
        op: u64,
        result: ClientResult<SearchResult>,
    },
}

impl Reply {
    pub fn op(&self) -> u64 {
        match self {
            Reply::Probe { op, .. }
            | Reply::Verify { op, .. }
            | Reply::Setup { op, .. }
            | Reply::Search { op, .. } => *op,
        }
    }
}

/// The request the gate is waiting on.
enum Pending {
    Probe {
        op: u64,
    },
    Verify {
        op: u64,
        key: Zeroizing<String>,
        /// Started from Loading with a cached key rather than by the operator.
        automatic: bool,
    },
    Setup {
        op: u64,
        key: Zeroizing<String>,
    },
    Search {
        op: u64,
    },
}

impl Pending {
    fn op(&self) -> u64 {
        match self {
            Pending::Probe { op }
            | Pending::Verify { op, .. }
            | Pending::Setup { op, .. }
            | Pending::Search { op } => *op,
        }
    }
}

// ── Gate ────────────────────────────────────────────────────────────────────

pub struct AdminGate {
    view: View,
    cache: SessionCache,
    pending: Option<Pending>,
    next_op: u64,
    notices: Vec<Notice>,
}

impl AdminGate {
    pub fn new(cache: SessionCache) -> Self {
        Self {
            view: View::Loading,
            cache,
            pending: None,
            next_op: 1,
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn presentation(&self) -> Presentation {
        match self.view {
            View::Loading => Presentation::Loading,
            View::Setup(_) => Presentation::Setup,
            View::Challenge(_) => Presentation::Challenge,
            View::Authenticated(_) => Presentation::Authenticated,
        }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// A probe, verification or setup is in flight; submit is disabled.
    pub fn is_verifying(&self) -> bool {
        matches!(
            self.pending,
            Some(Pending::Probe { .. } | Pending::Verify { .. } | Pending::Setup { .. })
        )
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.pending, Some(Pending::Search { .. }))
    }

    /// The result currently on display, if any.
    pub fn result(&self) -> Option<&SearchResult> {
        match &self.view {
            View::Authenticated(panel) => panel.result.as_ref(),
            _ => None,
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Start the mount-time existence probe. Only valid once, from Loading.
    pub fn mount(&mut self) -> Option<Request> {
        if self.view != View::Loading || self.pending.is_some() {
            return None;
        }
        let op = self.allocate_op();
        self.pending = Some(Pending::Probe { op });
        Some(Request::Probe { op })
    }

    /// Apply an edit to the focused input of the current form.
    pub fn edit(&mut self, edit: InputEdit) {
        match &mut self.view {
            View::Loading => {}
            View::Setup(form) => {
                let field = if form.field == 0 {
                    &mut form.new_key
                } else {
                    &mut form.confirm_key
                };
                match edit {
                    InputEdit::Char(c) => field.push(c),
                    InputEdit::Backspace => {
                        field.pop();
                    }
                    InputEdit::NextField | InputEdit::PrevField => {
                        form.field = 1 - form.field.min(1);
                    }
                }
            }
            View::Challenge(form) => apply_text_edit(&mut form.key, edit),
            View::Authenticated(panel) => apply_text_edit(&mut panel.username, edit),
        }
    }

    /// Submit whichever form is showing.
    pub fn submit(&mut self) -> Option<Request> {
        match self.presentation() {
            Presentation::Loading => None,
            Presentation::Setup => self.submit_setup(),
            Presentation::Challenge => self.submit_challenge(),
            Presentation::Authenticated => self.submit_search(),
        }
    }

    fn submit_setup(&mut self) -> Option<Request> {
        if self.pending.is_some() {
            return None;
        }
        let View::Setup(form) = &self.view else {
            return None;
        };
        if form.new_key.chars().count() < MIN_ADMIN_KEY_LEN {
            self.notify(NoticeLevel::Error, MSG_KEY_TOO_SHORT);
            return None;
        }
        if form.new_key != form.confirm_key {
            self.notify(NoticeLevel::Error, MSG_KEY_MISMATCH);
            return None;
        }
        let key = Zeroizing::new(form.new_key.clone());
        let op = self.allocate_op();
        self.pending = Some(Pending::Setup {
            op,
            key: key.clone(),
        });
        info!(op, "Submitting admin key setup");
        Some(Request::Setup { op, admin_key: key })
    }

    fn submit_challenge(&mut self) -> Option<Request> {
        if self.pending.is_some() {
            return None;
        }
        let View::Challenge(form) = &self.view else {
            return None;
        };
        let trimmed = form.key.trim();
        if trimmed.is_empty() {
            self.notify(NoticeLevel::Error, MSG_KEY_EMPTY);
            return None;
        }
        let key = Zeroizing::new(trimmed.to_string());
        Some(self.begin_verify(key, false))
    }

    fn submit_search(&mut self) -> Option<Request> {
        if self.pending.is_some() {
            return None;
        }
        let View::Authenticated(panel) = &self.view else {
            return None;
        };
        let Some(query) = SearchQuery::new(&panel.username) else {
            self.notify(NoticeLevel::Error, MSG_USERNAME_EMPTY);
            return None;
        };
        let Some(key) = self.cache.admin_key().map(|k| Zeroizing::new(k.to_string())) else {
            // Cache and view disagree; re-challenge rather than search blind.
            warn!("Authenticated without a cached admin key");
            self.enter_challenge();
            return None;
        };
        let op = self.allocate_op();
        self.pending = Some(Pending::Search { op });
        info!(op, username = query.username(), "Searching team tasks");
        Some(Request::Search {
            op,
            username: query.username().to_string(),
            admin_key: key,
        })
    }

    /// Drop back to the challenge and forget the key and any result.
    pub fn logout(&mut self) {
        if self.presentation() != Presentation::Authenticated {
            return;
        }
        // An in-flight search reply becomes stale and is dropped on arrival.
        self.pending = None;
        self.enter_challenge();
        info!("Operator logged out");
        self.notify(NoticeLevel::Info, MSG_LOGGED_OUT);
    }

    /// Apply a backend reply. May start a follow-up request.
    pub fn on_reply(&mut self, reply: Reply) -> Option<Request> {
        let op = reply.op();
        let pending = match self.pending.take() {
            Some(p) if p.op() == op => p,
            other => {
                debug!(op, "Ignoring stale backend reply");
                self.pending = other;
                return None;
            }
        };

        match (pending, reply) {
            (Pending::Probe { .. }, Reply::Probe { result, .. }) => self.on_probe(result),
            (Pending::Verify { key, automatic, .. }, Reply::Verify { result, .. }) => {
                self.on_verify(key, automatic, result);
                None
            }
            (Pending::Setup { key, .. }, Reply::Setup { result, .. }) => {
                self.on_setup(key, result);
                None
            }
            (Pending::Search { .. }, Reply::Search { result, .. }) => {
                self.on_search(result);
                None
            }
            (pending, _) => {
                warn!(op, "Backend reply kind does not match the pending request");
                self.pending = Some(pending);
                None
            }
        }
    }

    fn on_probe(&mut self, result: ClientResult<KeyStatus>) -> Option<Request> {
        match result {
            Ok(KeyStatus { exists: true }) => {
                if let Some(cached) = self.cache.admin_key() {
                    let key = Zeroizing::new(cached.to_string());
                    debug!("Admin key exists; verifying cached key");
                    return Some(self.begin_verify(key, true));
                }
                self.enter_challenge();
            }
            Ok(KeyStatus { exists: false }) => {
                info!("No admin key provisioned; entering setup");
                self.enter_setup();
            }
            Err(e) => {
                // Fails quietly into setup; a failing setup will surface it.
                warn!(error = %e, "Admin key probe failed");
                self.enter_setup();
            }
        }
        None
    }

    fn on_verify(
        &mut self,
        key: Zeroizing<String>,
        automatic: bool,
        result: ClientResult<VerifyResponse>,
    ) {
        match result {
            Ok(VerifyResponse { valid: true }) => {
                self.cache.set_admin_key(&key);
                self.enter_authenticated();
                info!(automatic, "Admin key verified");
                if !automatic {
                    self.notify(NoticeLevel::Success, MSG_LOGIN_OK);
                }
            }
            Ok(VerifyResponse { valid: false }) => {
                info!(automatic, "Admin key rejected");
                self.reject_to_challenge(!automatic, MSG_INVALID_KEY);
            }
            Err(e) if e.is_auth_rejection() => {
                info!(automatic, error = %e, "Admin key rejected");
                self.reject_to_challenge(!automatic, MSG_INVALID_KEY);
            }
            Err(e) => {
                warn!(automatic, error = %e, "Admin key verification failed");
                if automatic {
                    // Never leave Loading authenticated on an unverified key.
                    self.reject_to_challenge(false, MSG_VERIFY_FAILED);
                } else {
                    self.notify(NoticeLevel::Error, MSG_VERIFY_FAILED);
                }
            }
        }
    }

    fn on_setup(&mut self, key: Zeroizing<String>, result: ClientResult<SetupResponse>) {
        match result {
            Ok(SetupResponse { success: true }) => {
                self.cache.set_admin_key(&key);
                self.enter_authenticated();
                info!("Admin key provisioned");
                self.notify(NoticeLevel::Success, MSG_SETUP_OK);
            }
            Ok(SetupResponse { success: false }) => {
                warn!("Backend declined admin key setup");
                self.notify(NoticeLevel::Error, MSG_SETUP_FAILED);
            }
            Err(e) if e.is_auth_rejection() => {
                // A key is already provisioned server-side.
                warn!(error = %e, "Admin key setup refused");
                let text = e.detail().unwrap_or(MSG_ACCESS_DENIED).to_string();
                self.reject_to_challenge(true, &text);
            }
            Err(e) => {
                warn!(error = %e, "Admin key setup failed");
                let text = e.detail().unwrap_or(MSG_SETUP_FAILED).to_string();
                self.notify(NoticeLevel::Error, text);
            }
        }
    }

    fn on_search(&mut self, result: ClientResult<SearchResult>) {
        match result {
            Ok(found) => {
                if let SearchResult::Found(tasks) = &found {
                    let total = tasks.summary.total;
                    info!(total, "Search completed");
                    self.notify(NoticeLevel::Success, format!("{total} görev bulundu"));
                } else {
                    info!("Search returned no matching user");
                }
                if let View::Authenticated(panel) = &mut self.view {
                    panel.result = Some(found);
                }
            }
            Err(e) if e.is_auth_rejection() => {
                warn!(error = %e, "Search refused; re-challenging");
                self.reject_to_challenge(true, MSG_ACCESS_DENIED);
            }
            Err(e) => {
                warn!(error = %e, "Search failed");
                if let View::Authenticated(panel) = &mut self.view {
                    panel.result = None;
                }
                self.notify(NoticeLevel::Error, MSG_SEARCH_FAILED);
            }
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────────

    fn allocate_op(&mut self) -> u64 {
        let op = self.next_op;
        self.next_op = self.next_op.wrapping_add(1);
        op
    }

    fn begin_verify(&mut self, key: Zeroizing<String>, automatic: bool) -> Request {
        let op = self.allocate_op();
        self.pending = Some(Pending::Verify {
            op,
            key: key.clone(),
            automatic,
        });
        Request::Verify { op, admin_key: key }
    }

    fn reject_to_challenge(&mut self, announce: bool, text: &str) {
        self.enter_challenge();
        if announce {
            self.notify(NoticeLevel::Error, text);
        }
    }

    fn enter_setup(&mut self) {
        self.cache.clear_admin_key();
        self.view = View::Setup(SetupForm::default());
    }

    fn enter_challenge(&mut self) {
        self.cache.clear_admin_key();
        self.view = View::Challenge(ChallengeForm::default());
    }

    fn enter_authenticated(&mut self) {
        self.view = View::Authenticated(SearchPanel::default());
    }
}

fn apply_text_edit(field: &mut String, edit: InputEdit) {
    match edit {
        InputEdit::Char(c) => field.push(c),
        InputEdit::Backspace => {
            field.pop();
        }
        InputEdit::NextField | InputEdit::PrevField => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamtrack_client::ClientError;

    fn type_text(gate: &mut AdminGate, text: &str) {
        for c in text.chars() {
            gate.edit(InputEdit::Char(c));
        }
    }

    fn rejected(status: u16) -> ClientError {
        ClientError::Rejected {
            status,
            detail: None,
        }
    }

    fn forbidden() -> ClientError {
        ClientError::Forbidden {
            status: 403,
            detail: None,
        }
    }

    /// Mount and answer the probe.
    fn mounted(cache: SessionCache, exists: bool) -> (AdminGate, Option<Request>) {
        let mut gate = AdminGate::new(cache);
        let probe = gate.mount().expect("probe request");
        assert!(gate.is_verifying());
        let follow_up = gate.on_reply(Reply::Probe {
            op: probe.op(),
            result: Ok(KeyStatus { exists }),
        });
        (gate, follow_up)
    }

    fn authenticated(key: &str) -> AdminGate {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, key);
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Verify {
            op: req.op(),
            result: Ok(VerifyResponse { valid: true }),
        });
        gate.take_notices();
        assert_eq!(gate.presentation(), Presentation::Authenticated);
        gate
    }

    fn search_body() -> SearchResult {
        serde_json::from_value(serde_json::json!({
            "found": true,
            "user": {"name": "Sercan"},
            "summary": {"total": 3, "in_progress": 2, "backlog": 1},
            "tasks": [
                {"id": "1", "title": "T1", "status": "in_progress", "priority": "high", "jira_key": "ABC-1"},
                {"id": "2", "title": "T2", "status": "in_progress", "priority": "medium"},
                {"id": "3", "title": "T3", "status": "backlog", "priority": "low"}
            ]
        }))
        .unwrap()
    }

    fn run_search(gate: &mut AdminGate, username: &str, result: ClientResult<SearchResult>) {
        type_text(gate, username);
        let req = gate.submit().expect("search request");
        assert!(gate.is_searching());
        gate.on_reply(Reply::Search {
            op: req.op(),
            result,
        });
    }

    #[test]
    fn starts_in_loading_and_probes_once() {
        let mut gate = AdminGate::new(SessionCache::new());
        assert_eq!(gate.presentation(), Presentation::Loading);
        assert!(matches!(gate.mount(), Some(Request::Probe { .. })));
        assert!(gate.mount().is_none());
        // Nothing can be submitted while loading.
        assert!(gate.submit().is_none());
    }

    #[test]
    fn setup_then_authenticated() {
        let (mut gate, follow_up) = mounted(SessionCache::new(), false);
        assert!(follow_up.is_none());
        assert_eq!(gate.presentation(), Presentation::Setup);

        type_text(&mut gate, "secret1");
        gate.edit(InputEdit::NextField);
        type_text(&mut gate, "secret1");
        let req = gate.submit().expect("setup request");
        let Request::Setup { op, admin_key } = &req else {
            panic!("expected setup request, got {req:?}");
        };
        assert_eq!(admin_key.as_str(), "secret1");
        assert!(gate.is_verifying());

        gate.on_reply(Reply::Setup {
            op: *op,
            result: Ok(SetupResponse { success: true }),
        });
        assert_eq!(gate.presentation(), Presentation::Authenticated);
        assert_eq!(gate.cache().admin_key(), Some("secret1"));
        assert_eq!(
            gate.take_notices(),
            vec![Notice {
                level: NoticeLevel::Success,
                text: MSG_SETUP_OK.into()
            }]
        );
    }

    #[test]
    fn setup_key_length_boundary() {
        let (mut gate, _) = mounted(SessionCache::new(), false);
        type_text(&mut gate, "abcde");
        gate.edit(InputEdit::NextField);
        type_text(&mut gate, "abcde");
        assert!(gate.submit().is_none());
        assert_eq!(gate.take_notices()[0].text, MSG_KEY_TOO_SHORT);
        assert!(!gate.is_verifying());

        gate.edit(InputEdit::PrevField);
        gate.edit(InputEdit::Char('f'));
        gate.edit(InputEdit::NextField);
        gate.edit(InputEdit::Char('f'));
        assert!(matches!(gate.submit(), Some(Request::Setup { .. })));
    }

    #[test]
    fn setup_mismatch_is_local() {
        let (mut gate, _) = mounted(SessionCache::new(), false);
        type_text(&mut gate, "secret1");
        gate.edit(InputEdit::NextField);
        type_text(&mut gate, "secret2");
        assert!(gate.submit().is_none());
        assert_eq!(gate.take_notices()[0].text, MSG_KEY_MISMATCH);
        assert_eq!(gate.presentation(), Presentation::Setup);
    }

    #[test]
    fn setup_failure_surfaces_detail_and_stays() {
        let (mut gate, _) = mounted(SessionCache::new(), false);
        type_text(&mut gate, "secret1");
        gate.edit(InputEdit::NextField);
        type_text(&mut gate, "secret1");
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Setup {
            op: req.op(),
            result: Err(ClientError::Rejected {
                status: 400,
                detail: Some("Admin key already set".into()),
            }),
        });
        assert_eq!(gate.presentation(), Presentation::Setup);
        assert!(!gate.cache().has_admin_key());
        assert_eq!(gate.take_notices()[0].text, "Admin key already set");
        // Submit is enabled again.
        assert!(gate.submit().is_some());
    }

    #[test]
    fn setup_refused_drops_to_challenge() {
        let (mut gate, _) = mounted(SessionCache::new(), false);
        type_text(&mut gate, "secret1");
        gate.edit(InputEdit::NextField);
        type_text(&mut gate, "secret1");
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Setup {
            op: req.op(),
            result: Err(forbidden()),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert_eq!(gate.take_notices()[0].text, MSG_ACCESS_DENIED);
    }

    #[test]
    fn wrong_key_stays_in_challenge() {
        let (mut gate, follow_up) = mounted(SessionCache::new(), true);
        assert!(follow_up.is_none());
        assert_eq!(gate.presentation(), Presentation::Challenge);

        type_text(&mut gate, "wrong");
        let req = gate.submit().expect("verify request");
        gate.on_reply(Reply::Verify {
            op: req.op(),
            result: Ok(VerifyResponse { valid: false }),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(!gate.cache().has_admin_key());
        assert_eq!(
            gate.take_notices(),
            vec![Notice {
                level: NoticeLevel::Error,
                text: MSG_INVALID_KEY.into()
            }]
        );
    }

    #[test]
    fn blank_challenge_is_local() {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, "   ");
        assert!(gate.submit().is_none());
        assert_eq!(gate.take_notices()[0].text, MSG_KEY_EMPTY);
    }

    #[test]
    fn challenge_key_is_trimmed() {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, "  k3y-value ");
        let Some(Request::Verify { admin_key, .. }) = gate.submit() else {
            panic!("expected verify request");
        };
        assert_eq!(admin_key.as_str(), "k3y-value");
    }

    #[test]
    fn verify_transport_error_stays_in_challenge() {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, "secret1");
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Verify {
            op: req.op(),
            result: Err(rejected(502)),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert_eq!(gate.take_notices()[0].text, MSG_VERIFY_FAILED);
        // The typed key survives so the operator can retry.
        assert_eq!(
            gate.view(),
            &View::Challenge(ChallengeForm {
                key: "secret1".into()
            })
        );
    }

    #[test]
    fn duplicate_submit_is_blocked_while_verifying() {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, "secret1");
        assert!(gate.submit().is_some());
        assert!(gate.is_verifying());
        assert!(gate.submit().is_none());
    }

    #[test]
    fn cached_key_is_verified_on_mount() {
        let mut cache = SessionCache::new();
        cache.set_admin_key("cached");
        let (mut gate, follow_up) = mounted(cache, true);
        let Some(Request::Verify { op, admin_key }) = follow_up else {
            panic!("expected automatic verify");
        };
        assert_eq!(admin_key.as_str(), "cached");
        assert_eq!(gate.presentation(), Presentation::Loading);
        assert!(gate.is_verifying());

        gate.on_reply(Reply::Verify {
            op,
            result: Ok(VerifyResponse { valid: true }),
        });
        assert_eq!(gate.presentation(), Presentation::Authenticated);
        assert_eq!(gate.cache().admin_key(), Some("cached"));
        assert!(gate.take_notices().is_empty());
    }

    #[test]
    fn stale_cached_key_lands_in_challenge() {
        let mut cache = SessionCache::new();
        cache.set_admin_key("stale");
        let (mut gate, follow_up) = mounted(cache, true);
        let op = follow_up.unwrap().op();
        gate.on_reply(Reply::Verify {
            op,
            result: Ok(VerifyResponse { valid: false }),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(!gate.cache().has_admin_key());
    }

    #[test]
    fn cached_key_with_failing_verify_is_not_trusted() {
        let mut cache = SessionCache::new();
        cache.set_admin_key("cached");
        let (mut gate, follow_up) = mounted(cache, true);
        gate.on_reply(Reply::Verify {
            op: follow_up.unwrap().op(),
            result: Err(rejected(500)),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(!gate.cache().has_admin_key());
    }

    #[test]
    fn cached_key_ignored_when_no_key_provisioned() {
        let mut cache = SessionCache::new();
        cache.set_admin_key("leftover");
        let (gate, follow_up) = mounted(cache, false);
        assert!(follow_up.is_none());
        assert_eq!(gate.presentation(), Presentation::Setup);
        assert!(!gate.cache().has_admin_key());
    }

    #[test]
    fn probe_failure_routes_to_setup() {
        let mut gate = AdminGate::new(SessionCache::new());
        let op = gate.mount().unwrap().op();
        gate.on_reply(Reply::Probe {
            op,
            result: Err(rejected(500)),
        });
        assert_eq!(gate.presentation(), Presentation::Setup);
        assert!(gate.take_notices().is_empty());
    }

    #[test]
    fn search_found_stores_result() {
        let mut gate = authenticated("k");
        run_search(&mut gate, "sercano", Ok(search_body()));
        assert!(!gate.is_searching());
        assert_eq!(gate.result().unwrap().tasks().len(), 3);
        assert_eq!(
            gate.take_notices(),
            vec![Notice {
                level: NoticeLevel::Success,
                text: "3 görev bulundu".into()
            }]
        );
    }

    #[test]
    fn search_request_carries_trimmed_user_and_key() {
        let mut gate = authenticated("k");
        type_text(&mut gate, "  sercano  ");
        let Some(Request::Search {
            username,
            admin_key,
            ..
        }) = gate.submit()
        else {
            panic!("expected search request");
        };
        assert_eq!(username, "sercano");
        assert_eq!(admin_key.as_str(), "k");
        assert!(gate.submit().is_none());
    }

    #[test]
    fn search_forbidden_rechallenges() {
        let mut gate = authenticated("k");
        run_search(&mut gate, "sercano", Ok(search_body()));
        gate.take_notices();
        gate.edit(InputEdit::Backspace);
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Search {
            op: req.op(),
            result: Err(forbidden()),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(!gate.cache().has_admin_key());
        assert!(gate.result().is_none());
        assert_eq!(gate.take_notices()[0].text, MSG_ACCESS_DENIED);
    }

    #[test]
    fn search_failure_discards_previous_result() {
        let mut gate = authenticated("k");
        run_search(&mut gate, "sercano", Ok(search_body()));
        assert!(gate.result().is_some());
        gate.take_notices();

        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Search {
            op: req.op(),
            result: Err(rejected(500)),
        });
        assert_eq!(gate.presentation(), Presentation::Authenticated);
        assert!(gate.result().is_none());
        assert_eq!(gate.take_notices()[0].text, MSG_SEARCH_FAILED);
    }

    #[test]
    fn not_found_is_stored_without_count_notice() {
        let mut gate = authenticated("k");
        let not_found = SearchResult::NotFound {
            message: "Kullanıcı bulunamadı".into(),
        };
        run_search(&mut gate, "ghost", Ok(not_found.clone()));
        assert_eq!(gate.result(), Some(&not_found));
        assert!(gate.take_notices().is_empty());
    }

    #[test]
    fn blank_username_is_local() {
        let mut gate = authenticated("k");
        type_text(&mut gate, "   ");
        assert!(gate.submit().is_none());
        assert!(!gate.is_searching());
        assert_eq!(gate.take_notices()[0].text, MSG_USERNAME_EMPTY);
    }

    #[test]
    fn logout_clears_key_and_result() {
        let mut gate = authenticated("k");
        run_search(&mut gate, "sercano", Ok(search_body()));
        gate.take_notices();

        gate.logout();
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(!gate.cache().has_admin_key());
        assert!(gate.result().is_none());
        assert_eq!(
            gate.take_notices(),
            vec![Notice {
                level: NoticeLevel::Info,
                text: MSG_LOGGED_OUT.into()
            }]
        );
    }

    #[test]
    fn logout_then_same_key_restores_session() {
        let mut gate = authenticated("secret1");
        gate.logout();
        type_text(&mut gate, "secret1");
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Verify {
            op: req.op(),
            result: Ok(VerifyResponse { valid: true }),
        });
        assert_eq!(gate.presentation(), Presentation::Authenticated);
        assert_eq!(gate.cache().admin_key(), Some("secret1"));
    }

    #[test]
    fn repeated_verification_is_idempotent() {
        let first = authenticated("secret1");
        let second = authenticated("secret1");
        assert_eq!(first.view(), second.view());
        assert_eq!(first.cache().admin_key(), second.cache().admin_key());
    }

    #[test]
    fn search_reply_after_logout_is_ignored() {
        let mut gate = authenticated("k");
        type_text(&mut gate, "sercano");
        let req = gate.submit().unwrap();
        gate.logout();
        gate.on_reply(Reply::Search {
            op: req.op(),
            result: Ok(search_body()),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(gate.result().is_none());
    }

    #[test]
    fn stale_op_id_is_ignored() {
        let (mut gate, _) = mounted(SessionCache::new(), true);
        type_text(&mut gate, "secret1");
        let req = gate.submit().unwrap();
        gate.on_reply(Reply::Verify {
            op: req.op() + 100,
            result: Ok(VerifyResponse { valid: true }),
        });
        assert_eq!(gate.presentation(), Presentation::Challenge);
        assert!(gate.is_verifying());
    }
}
