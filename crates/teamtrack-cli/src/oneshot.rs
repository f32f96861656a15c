//! Non-interactive `status` and `search` subcommands.

use crate::gate::{MSG_ACCESS_DENIED, MSG_USERNAME_EMPTY, MSG_SEARCH_FAILED};
use anyhow::{bail, Context};
use colored::Colorize;
use std::io::Write;
use teamtrack_client::AdminBackend;
use teamtrack_types::tasks::{Priority, SearchQuery, SearchResult, Task, TeamTasks};
use teamtrack_types::truncate_str;
use tracing::info;

const TITLE_WIDTH: usize = 48;

/// Print whether the backend already has an admin key.
pub fn run_status(backend: &dyn AdminBackend, out: &mut impl Write) -> anyhow::Result<()> {
    let status = backend
        .key_exists()
        .context("admin key probe failed")?;
    info!(exists = status.exists, "Probed admin key");
    if status.exists {
        writeln!(out, "{} Admin anahtar\u{0131} tan\u{0131}ml\u{0131}", "\u{2714}".green())?;
    } else {
        writeln!(
            out,
            "{} Admin anahtar\u{0131} hen\u{00fc}z olu\u{015f}turulmam\u{0131}\u{015f}",
            "\u{26a0}".yellow()
        )?;
    }
    Ok(())
}

/// Run one team-task search and print it as a table.
pub fn run_search(
    backend: &dyn AdminBackend,
    tracker_url: &str,
    username: &str,
    admin_key: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let Some(query) = SearchQuery::new(username) else {
        bail!(MSG_USERNAME_EMPTY);
    };
    info!(username = query.username(), "Running one-shot search");

    let result = match backend.team_tasks(query.username(), admin_key) {
        Ok(result) => result,
        Err(e) if e.is_auth_rejection() => bail!(MSG_ACCESS_DENIED),
        Err(e) => return Err(anyhow::Error::new(e).context(MSG_SEARCH_FAILED)),
    };

    match &result {
        SearchResult::NotFound { message } => {
            writeln!(out, "{} {}", "\u{26a0}".yellow(), message.yellow())?;
        }
        SearchResult::Found(found) => print_found(found, tracker_url, out)?,
    }
    Ok(())
}

fn print_found(found: &TeamTasks, tracker_url: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let s = &found.summary;
    writeln!(
        out,
        "{}  toplam {} \u{00b7} devam eden {} \u{00b7} backlog {}",
        found.user.name.bold(),
        s.total.to_string().cyan(),
        s.in_progress.to_string().blue(),
        s.backlog.to_string().yellow(),
    )?;

    if found.tasks.is_empty() {
        writeln!(out, "  {}", "Bu kullan\u{0131}c\u{0131}n\u{0131}n a\u{00e7}\u{0131}k g\u{00f6}revi yok".dimmed())?;
        return Ok(());
    }

    writeln!(
        out,
        "  {:<w$}  {:<16}  {:<8}  {}",
        "G\u{00f6}rev".bold(),
        "Durum".bold(),
        "\u{00d6}ncelik".bold(),
        "Ba\u{011f}lant\u{0131}".bold(),
        w = TITLE_WIDTH
    )?;
    for task in &found.tasks {
        writeln!(out, "  {}", task_line(task, tracker_url))?;
    }
    Ok(())
}

fn task_line(task: &Task, tracker_url: &str) -> String {
    let title = truncate_str(&task.title, TITLE_WIDTH);
    let priority = task.priority.label();
    let priority = match task.priority {
        Priority::Critical => priority.red().bold(),
        Priority::High => priority.red(),
        Priority::Medium => priority.yellow(),
        Priority::Low => priority.green(),
        Priority::Other(_) => priority.normal(),
    };
    let link = task.issue_link(tracker_url).unwrap_or_default();
    format!(
        "{:<w$}  {:<16}  {:<8}  {}",
        title,
        task.status_label(),
        priority,
        link.dimmed(),
        w = TITLE_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamtrack_client::{ClientError, ClientResult};
    use teamtrack_types::admin::{KeyStatus, SetupResponse, VerifyResponse};

    struct CannedBackend {
        exists: bool,
        search: fn() -> ClientResult<SearchResult>,
    }

    impl AdminBackend for CannedBackend {
        fn key_exists(&self) -> ClientResult<KeyStatus> {
            Ok(KeyStatus {
                exists: self.exists,
            })
        }

        fn setup_key(&self, _admin_key: &str) -> ClientResult<SetupResponse> {
            Ok(SetupResponse { success: true })
        }

        fn verify_key(&self, _admin_key: &str) -> ClientResult<VerifyResponse> {
            Ok(VerifyResponse { valid: true })
        }

        fn team_tasks(&self, _username: &str, _admin_key: &str) -> ClientResult<SearchResult> {
            (self.search)()
        }
    }

    fn found() -> ClientResult<SearchResult> {
        Ok(serde_json::from_str(
            r#"{
                "found": true,
                "user": {"name": "Sercan O."},
                "summary": {"total": 2, "in_progress": 1, "backlog": 1},
                "tasks": [
                    {"id": 1, "title": "Login fix", "status": "in_progress",
                     "jira_status": "In Review", "priority": "high", "jira_key": "ABC-1"},
                    {"id": 2, "title": "Cleanup", "status": "backlog", "priority": "low"}
                ]
            }"#,
        )
        .unwrap())
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> anyhow::Result<()>) -> anyhow::Result<String> {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn status_reports_existing_key() {
        let backend = CannedBackend {
            exists: true,
            search: found,
        };
        let text = render(|out| run_status(&backend, out)).unwrap();
        assert!(text.contains("tan\u{0131}ml\u{0131}"));
    }

    #[test]
    fn search_prints_tasks_with_links() {
        let backend = CannedBackend {
            exists: true,
            search: found,
        };
        let text = render(|out| {
            run_search(&backend, "https://jira.example.com/", " sercano ", "k", out)
        })
        .unwrap();
        assert!(text.contains("Sercan O."));
        assert!(text.contains("toplam 2"));
        assert!(text.contains("In Review"));
        assert!(text.contains("Y\u{00fc}ksek"));
        assert!(text.contains("https://jira.example.com/browse/ABC-1"));
        assert!(text.contains("backlog"));
        assert!(text.contains("D\u{00fc}\u{015f}\u{00fc}k"));
    }

    #[test]
    fn not_found_prints_message() {
        let backend = CannedBackend {
            exists: true,
            search: || {
                Ok(SearchResult::NotFound {
                    message: "Kullan\u{0131}c\u{0131} bulunamad\u{0131}".into(),
                })
            },
        };
        let text = render(|out| run_search(&backend, "", "ghost", "k", out)).unwrap();
        assert!(text.contains("bulunamad\u{0131}"));
    }

    #[test]
    fn blank_username_and_forbidden_fail() {
        let backend = CannedBackend {
            exists: true,
            search: || {
                Err(ClientError::Forbidden {
                    status: 403,
                    detail: None,
                })
            },
        };
        let err = render(|out| run_search(&backend, "", "   ", "k", out)).unwrap_err();
        assert_eq!(err.to_string(), MSG_USERNAME_EMPTY);
        let err = render(|out| run_search(&backend, "", "sercano", "k", out)).unwrap_err();
        assert_eq!(err.to_string(), MSG_ACCESS_DENIED);
    }
}
