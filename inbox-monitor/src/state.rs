use crate::error::FetchError;
use crate::pagination::{PageView, Pagination};
use serde::{Deserialize, Serialize};

/// What the dashboard currently shows, with error tracking and last-known-good support
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// Last successfully loaded email page (None if never succeeded)
    pub last_page: Option<LoadedPage>,
    /// Last successfully fetched aggregate counters
    pub stats: Option<Stats>,
    /// Current error state (None if no active error)
    pub current_error: Option<FetchError>,
}

#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub emails: Vec<EmailSummary>,
    pub view: PageView,
    pub timestamp: std::time::SystemTime,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_page(&mut self, emails: Vec<EmailSummary>, view: PageView) {
        self.last_page = Some(LoadedPage {
            emails,
            view,
            timestamp: std::time::SystemTime::now(),
        });
        self.current_error = None;
    }

    pub fn update_stats(&mut self, stats: Stats) {
        self.stats = Some(stats);
    }

    pub fn update_error(&mut self, error: FetchError) {
        self.current_error = Some(error);
    }
}

/// One row of `/api/emails`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmailSummary {
    pub id: i64,
    #[serde(default)]
    pub subject: Option<String>,
    pub from: String,
    #[serde(default)]
    pub company: Option<CompanyRef>,
    #[serde(default)]
    pub has_pdf: bool,
    #[serde(default)]
    pub pdf_emails: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Company attached to an email when the sender matched one of its addresses
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CompanyRef {
    pub name: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Body of a successful `/api/emails` response
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmailPage {
    #[serde(default)]
    pub data: Vec<EmailSummary>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct Stats {
    pub companies: u64,
    pub pdfs: u64,
    pub emails: u64,
}

impl Stats {
    pub fn companies_label(&self) -> String {
        format!("{} cég", self.companies)
    }

    pub fn pdfs_label(&self) -> String {
        format!("{} PDF", self.pdfs)
    }

    pub fn emails_label(&self) -> String {
        format!("{} e-mail", self.emails)
    }
}
