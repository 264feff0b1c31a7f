//! Plain-text rendering for CLI output.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use wikicache_core::wiki::{RefreshStatus, RefreshSummary};
use wikicache_core::{Error, LogSummary, RelatedResolution, Resolution, WikiEntry, WikiEntryLog};

const RULE_WIDTH: usize = 80;
const PREVIEW_CHARS: usize = 500;

/// Layout of `show-logs` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One block per row with every flag spelled out.
    Detailed,
    /// One line per row.
    Compact,
}

pub fn resolution(r: &Resolution) -> String {
    format!("{}\n\n=== Wikipedia: {} ===\n{}", r.message(), r.title, r.content)
}

pub fn related(result: &RelatedResolution) -> String {
    let mut out = resolution(&result.main);
    if result.related.is_empty() {
        out.push_str("\n\nNo related articles found.");
        return out;
    }

    out.push_str("\n\nRelated Articles:");
    for article in &result.related {
        out.push_str(&format!("\n\n* {} ({})\n{}", article.title, article.message(), preview(&article.content)));
    }
    out
}

/// First few hundred characters, cut on a char boundary.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn entries(entries: &[WikiEntry]) -> String {
    if entries.is_empty() {
        return "No Wikipedia articles found in the database.".into();
    }

    let mut out = String::from("Stored Wikipedia Articles:");
    for entry in entries {
        out.push_str(&format!("\n* {} (stored on {})", entry.title, timestamp(&entry.created_at)));
    }
    out.push_str(&format!("\n\nTotal entries: {}", entries.len()));
    out
}

pub fn logs(logs: &[WikiEntryLog], format: LogFormat) -> String {
    if logs.is_empty() {
        return "No logs found.".into();
    }

    let mut out = format!("Article Action Logs (showing {} entries)", logs.len());
    for log in logs {
        match format {
            LogFormat::Detailed => out.push_str(&detailed_row(log)),
            LogFormat::Compact => out.push_str(&compact_row(log)),
        }
    }
    out.push_str(&summary(&LogSummary::from_logs(logs)));
    out
}

fn detailed_row(log: &WikiEntryLog) -> String {
    let cache = if log.cache_hit { "Cache Hit" } else { "Cache Miss" };
    let update = if log.was_updated { "Updated" } else { "No Update" };
    let needed = if log.needed_update { "Yes" } else { "No" };
    format!(
        "\n{}\n{}\nTime: {}\nAction: {}\nCache Status: {cache}\nUpdate Status: {update}\nNeeded Update: {needed}",
        "-".repeat(RULE_WIDTH),
        log.title,
        timestamp(&log.action_time),
        log.action_type.as_str().to_uppercase(),
    )
}

fn compact_row(log: &WikiEntryLog) -> String {
    let marker = if log.cache_hit {
        "HIT"
    } else if log.was_updated {
        "NEW"
    } else {
        "---"
    };
    format!(
        "\n{marker} {} | {:^7} | {}",
        log.action_time.format("%Y-%m-%d %H:%M"),
        log.action_type.as_str(),
        log.title
    )
}

fn summary(s: &LogSummary) -> String {
    format!(
        "\n\nSummary:\nTotal Entries: {}\nCache Hits: {} ({:.1}%)\nUpdates: {} ({:.1}%)",
        s.total,
        s.cache_hits,
        s.cache_hit_pct(),
        s.updates,
        s.update_pct()
    )
}

pub fn refresh(summary: &RefreshSummary) -> String {
    if summary.total() == 0 {
        return "No entries found in database to refresh.".into();
    }

    let mut out = format!("Refreshed {} articles:", summary.total());
    for outcome in &summary.outcomes {
        let line = match &outcome.status {
            RefreshStatus::Updated => format!("\nUpdated '{}'", outcome.title),
            RefreshStatus::Skipped => format!("\nSkipped '{}' (not old enough to update)", outcome.title),
            RefreshStatus::Failed(reason) => format!("\nFailed '{}': {reason}", outcome.title),
        };
        out.push_str(&line);
    }
    out.push_str(&format!(
        "\n\nRefresh Summary:\nTotal entries: {}\nUpdated: {}\nSkipped: {}\nErrors: {}",
        summary.total(),
        summary.updated(),
        summary.skipped(),
        summary.failed()
    ));
    out
}

/// One-line error for stderr; a missing article reads differently from an outage.
pub fn error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>() {
        Some(Error::ArticleNotFound(title)) => format!("Error: Wikipedia article '{title}' not found."),
        Some(e @ (Error::FetchFailed(_) | Error::ParseFailed(_))) => {
            format!("Error: Wikipedia is unavailable or returned an unexpected response ({e})")
        }
        _ => format!("Error: {err:#}"),
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wikicache_core::ActionType;
    use wikicache_core::CacheStatus;
    use wikicache_core::wiki::RefreshOutcome;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 13, 7, 9).unwrap()
    }

    fn log(title: &str, action_type: ActionType, cache_hit: bool, was_updated: bool) -> WikiEntryLog {
        WikiEntryLog {
            id: 1,
            wiki_entry_id: Some(1),
            title: title.into(),
            action_type,
            action_time: at(),
            cache_hit,
            needed_update: !cache_hit,
            was_updated,
        }
    }

    #[test]
    fn test_compact_logs_with_summary() {
        let rows = [log("Cat", ActionType::Check, true, false), log("Dog", ActionType::Create, false, true)];
        let out = logs(&rows, LogFormat::Compact);

        assert!(out.starts_with("Article Action Logs (showing 2 entries)"));
        assert!(out.contains("HIT 2024-05-04 13:07 |  check  | Cat"));
        assert!(out.contains("NEW 2024-05-04 13:07 | create  | Dog"));
        assert!(out.contains("Cache Hits: 1 (50.0%)"));
        assert!(out.contains("Updates: 1 (50.0%)"));
    }

    #[test]
    fn test_detailed_logs() {
        let out = logs(&[log("Cat", ActionType::Update, false, true)], LogFormat::Detailed);
        assert!(out.contains("Time: 2024-05-04 13:07:09"));
        assert!(out.contains("Action: UPDATE"));
        assert!(out.contains("Cache Status: Cache Miss"));
        assert!(out.contains("Update Status: Updated"));
        assert!(out.contains("Needed Update: Yes"));
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(logs(&[], LogFormat::Detailed), "No logs found.");
        assert_eq!(entries(&[]), "No Wikipedia articles found in the database.");
        assert_eq!(refresh(&RefreshSummary::default()), "No entries found in database to refresh.");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(600);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_related_without_related_articles() {
        let main = Resolution { entry_id: 1, title: "Cat".into(), content: "Cats.".into(), status: CacheStatus::CacheHit };
        let out = related(&RelatedResolution { main, related: vec![] });
        assert!(out.starts_with("Retrieved from database cache."));
        assert!(out.ends_with("No related articles found."));
    }

    #[test]
    fn test_refresh_summary() {
        let summary = RefreshSummary {
            outcomes: vec![
                RefreshOutcome { title: "A".into(), status: RefreshStatus::Updated },
                RefreshOutcome { title: "B".into(), status: RefreshStatus::Failed("FETCH_FAILED: 503".into()) },
            ],
        };
        let out = refresh(&summary);
        assert!(out.contains("Updated 'A'"));
        assert!(out.contains("Failed 'B': FETCH_FAILED: 503"));
        assert!(out.contains("Errors: 1"));
    }

    #[test]
    fn test_error_messages_distinguish_not_found() {
        let not_found = anyhow::Error::from(Error::ArticleNotFound("Qwxzv".into()));
        assert_eq!(error(&not_found), "Error: Wikipedia article 'Qwxzv' not found.");

        let outage = anyhow::Error::from(Error::FetchFailed("status 503".into()));
        assert!(error(&outage).starts_with("Error: Wikipedia is unavailable"));

        let other = anyhow::anyhow!("boom");
        assert_eq!(error(&other), "Error: boom");
    }
}
