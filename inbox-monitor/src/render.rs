use crate::pagination::PageView;
use crate::state::{EmailSummary, Stats};
use chrono::DateTime;
use tracing::debug;

/// Dashboard date format, e.g. `2024. 03. 05. 14:07`
const DATE_FORMAT: &str = "%Y. %m. %d. %H:%M";

/// Format a backend timestamp in the offset the backend sent it in.
/// Unparseable input is shown as-is; a missing date becomes `-`.
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date.filter(|d| !d.is_empty()) else {
        return "-".to_string();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.format(DATE_FORMAT).to_string(),
        Err(e) => {
            debug!(date = raw, error = %e, "Unparseable email date");
            raw.to_string()
        }
    }
}

pub fn sender_display(email: &EmailSummary) -> String {
    match &email.company {
        Some(company) => format!("{} <{}>", company.name, email.from),
        None => email.from.clone(),
    }
}

pub fn pdf_badge(has_pdf: bool) -> &'static str {
    if has_pdf { "Van" } else { "Nincs" }
}

pub fn pdf_addresses(email: &EmailSummary) -> String {
    if email.pdf_emails.is_empty() {
        "-".to_string()
    } else {
        email.pdf_emails.join(", ")
    }
}

/// One table row as display cells: id, sender, PDF badge, PDF addresses, date
pub fn row_cells(email: &EmailSummary) -> [String; 5] {
    [
        email.id.to_string(),
        sender_display(email),
        pdf_badge(email.has_pdf).to_string(),
        pdf_addresses(email),
        format_date(email.date.as_deref()),
    ]
}

/// Case-insensitive substring search over each row's rendered text.
/// An empty or blank term keeps every row.
pub fn filter_rows<'a>(emails: &'a [EmailSummary], term: &str) -> Vec<&'a EmailSummary> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return emails.iter().collect();
    }

    emails
        .iter()
        .filter(|email| row_cells(email).join(" ").to_lowercase().contains(&needle))
        .collect()
}

pub fn render_table(emails: &[&EmailSummary], view: &PageView) -> String {
    let mut out = String::new();
    for email in emails {
        out.push_str(&row_cells(email).join(" | "));
        out.push('\n');
    }

    let prev = if view.prev_enabled { "[<]" } else { " < " };
    let next = if view.next_enabled { "[>]" } else { " > " };
    out.push_str(&format!("{} {} {}", prev, view.label(), next));
    out
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "{} · {} · {}",
        stats.companies_label(),
        stats.pdfs_label(),
        stats.emails_label()
    )
}
