//! Team-task search envelope.
//!
//! `GET /admin/team-tasks` answers with one of two shapes discriminated by
//! the boolean `found` field. Serde cannot tag on a bool, so the envelope is
//! decoded through [`RawSearchResult`] and folded into [`SearchResult`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A validated search query: a trimmed, non-empty username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    username: String,
}

impl SearchQuery {
    /// Build a query from raw operator input. Returns `None` for empty or
    /// whitespace-only input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                username: trimmed.to_string(),
            })
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Outcome of a team-task search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSearchResult", into = "RawSearchResult")]
pub enum SearchResult {
    /// The user exists in the issue tracker.
    Found(TeamTasks),
    /// The user could not be resolved; `message` explains why.
    NotFound { message: String },
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }

    /// Tasks of a found result; empty for not-found.
    pub fn tasks(&self) -> &[Task] {
        match self {
            SearchResult::Found(found) => &found.tasks,
            SearchResult::NotFound { .. } => &[],
        }
    }
}

/// Payload of a found search result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TeamTasks {
    pub user: UserInfo,
    pub summary: TaskSummary,
    pub tasks: Vec<Task>,
}

/// The user a search resolved to. Fields beyond `name` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Task counts for the searched user. Absent or null counts read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskSummary {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub in_progress: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub backlog: u64,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// A single open work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    /// Tracker-side status label; overrides `status` for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_status: Option<String>,
    pub priority: Priority,
    /// Issue key (e.g. `ABC-1`) used to build the deep link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_key: Option<String>,
}

impl Task {
    /// Label shown in the status column: the tracker label when present,
    /// otherwise the raw status token.
    pub fn status_label(&self) -> &str {
        match self.jira_status.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => self.status.as_str(),
        }
    }

    /// Issue key, if the task has a non-empty one.
    pub fn issue_key(&self) -> Option<&str> {
        self.jira_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Deep link into the issue tracker, if the task carries an issue key.
    pub fn issue_link(&self, tracker_url: &str) -> Option<String> {
        self.issue_key().map(|key| issue_link(tracker_url, key))
    }
}

/// Compose `<tracker_url>/browse/<key>`.
pub fn issue_link(tracker_url: &str, key: &str) -> String {
    format!("{}/browse/{}", tracker_url.trim_end_matches('/'), key)
}

/// Stable task identifier. The backend emits either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Int(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// Workflow status of a task. Unknown tokens are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    InProgress,
    Backlog,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Backlog => "backlog",
            TaskStatus::Other(s) => s,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "in_progress" => TaskStatus::InProgress,
            "backlog" => TaskStatus::Backlog,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// Task priority. Unknown tokens are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Other(s) => s,
        }
    }

    /// Localized label; unknown tokens fall through unchanged.
    pub fn label(&self) -> &str {
        match self {
            Priority::Critical => "Kritik",
            Priority::High => "Yüksek",
            Priority::Medium => "Orta",
            Priority::Low => "Düşük",
            Priority::Other(s) => s,
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        match s.as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(s),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

// ── Envelope decoding ───────────────────────────────────────────────────────

/// Flat wire shape of the search envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawSearchResult {
    found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<TaskSummary>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl From<RawSearchResult> for SearchResult {
    fn from(raw: RawSearchResult) -> Self {
        if raw.found {
            SearchResult::Found(TeamTasks {
                user: raw.user.unwrap_or_default(),
                summary: raw.summary.unwrap_or_default(),
                tasks: raw.tasks,
            })
        } else {
            SearchResult::NotFound {
                message: raw.message.unwrap_or_default(),
            }
        }
    }
}

impl From<SearchResult> for RawSearchResult {
    fn from(result: SearchResult) -> Self {
        match result {
            SearchResult::Found(found) => RawSearchResult {
                found: true,
                message: None,
                user: Some(found.user),
                summary: Some(found.summary),
                tasks: found.tasks,
            },
            SearchResult::NotFound { message } => RawSearchResult {
                found: false,
                message: Some(message),
                user: None,
                summary: None,
                tasks: Vec::new(),
            },
        }
    }
}
