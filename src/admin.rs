//! Admin views over the policy database.
//!
//! Read-only: fetches the two tables and renders Markdown reports for the
//! terminal. A fetch failure prints a notice and leaves an empty-state
//! report, it never aborts the process.

use tracing::warn;

use crate::store::{PolicyDetail, PolicySource, PolicyStore, SourceStatus};

fn status_badge(status: SourceStatus) -> &'static str {
    match status {
        SourceStatus::Pending => "pending",
        SourceStatus::Processed => "processed",
        SourceStatus::Failed => "failed",
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn dash_if_empty(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => truncate(v, 40),
        _ => "-".to_string(),
    }
}

/// Render the policy-sources table as Markdown, newest first (store order).
pub fn render_policy_sources(sources: &[PolicySource]) -> String {
    if sources.is_empty() {
        return "# Policy Sources\n\nNo policy sources recorded.".to_string();
    }

    let processed = sources
        .iter()
        .filter(|s| s.status == SourceStatus::Processed)
        .count();
    let failed = sources
        .iter()
        .filter(|s| s.status == SourceStatus::Failed)
        .count();

    let mut lines = vec![
        "# Policy Sources".to_string(),
        String::new(),
        format!(
            "{} sources ({processed} processed, {failed} failed)",
            sources.len()
        ),
        String::new(),
        "| URL | Title | Status | Discovered |".to_string(),
        "|-----|-------|--------|------------|".to_string(),
    ];

    for source in sources {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            truncate(&source.url, 50),
            dash_if_empty(source.title.as_deref()),
            status_badge(source.status),
            truncate(&source.discovered_at, 19),
        ));
    }

    lines.join("\n")
}

/// Render the policy-details table as Markdown, newest first (store order).
pub fn render_policy_details(details: &[PolicyDetail]) -> String {
    if details.is_empty() {
        return "# Policy Details\n\nNo policy details extracted yet.".to_string();
    }

    let mut lines = vec![
        "# Policy Details".to_string(),
        String::new(),
        format!("{} plans extracted", details.len()),
        String::new(),
        "| Plan | Insurer | Sum Insured | Premium | Entry Age | Waiting |".to_string(),
        "|------|---------|-------------|---------|-----------|---------|".to_string(),
    ];

    for detail in details {
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            dash_if_empty(detail.plan_name.as_deref()),
            dash_if_empty(detail.insurance_company_name.as_deref()),
            dash_if_empty(detail.sum_insured.as_deref()),
            dash_if_empty(detail.premium.as_deref()),
            dash_if_empty(detail.entry_age.as_deref()),
            dash_if_empty(detail.waiting_period.as_deref()),
        ));
    }

    lines.join("\n")
}

/// Fetch both tables and print their reports to stdout.
pub async fn run_report(store: &PolicyStore) {
    match store.fetch_policy_sources().await {
        Ok(sources) => println!("{}\n", render_policy_sources(&sources)),
        Err(e) => {
            warn!("Failed to load policy sources: {e}");
            println!("{}\n", render_policy_sources(&[]));
        }
    }

    match store.fetch_policy_details().await {
        Ok(details) => println!("{}", render_policy_details(&details)),
        Err(e) => {
            warn!("Failed to load policy details: {e}");
            println!("{}", render_policy_details(&[]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, status: SourceStatus) -> PolicySource {
        PolicySource {
            id: "s1".into(),
            url: url.into(),
            title: None,
            status,
            discovered_at: "2025-06-01T10:00:00Z".into(),
            processed_at: None,
            created_at: "2025-06-01T10:00:00Z".into(),
            updated_at: "2025-06-01T10:00:00Z".into(),
        }
    }

    #[test]
    fn empty_tables_render_an_empty_state() {
        assert!(render_policy_sources(&[]).contains("No policy sources"));
        assert!(render_policy_details(&[]).contains("No policy details"));
    }

    #[test]
    fn source_report_counts_statuses() {
        let sources = vec![
            source("https://a.example/p1.pdf", SourceStatus::Processed),
            source("https://a.example/p2.pdf", SourceStatus::Failed),
            source("https://a.example/p3.pdf", SourceStatus::Pending),
        ];
        let report = render_policy_sources(&sources);
        assert!(report.contains("3 sources (1 processed, 1 failed)"));
        assert!(report.contains("| https://a.example/p2.pdf | - | failed |"));
    }

    #[test]
    fn long_urls_are_truncated() {
        let long = format!("https://a.example/{}", "x".repeat(80));
        let report = render_policy_sources(&[source(&long, SourceStatus::Pending)]);
        assert!(report.contains("..."));
        assert!(!report.contains(&long));
    }
}
