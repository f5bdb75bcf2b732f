use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rows per page; the backend pages the email list in fixed chunks of ten.
pub const PAGE_SIZE: u32 = 10;

/// Pagination metadata as reported by `/api/emails`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub total: u32,
}

/// What the pager widget should show for a given [`Pagination`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub start: u32,
    pub end: u32,
    pub total: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageView {
    pub fn from_pagination(pagination: &Pagination) -> Self {
        let page = pagination.page.max(1);
        // Page numbers come from the server; saturate rather than overflow.
        let start = (page - 1).saturating_mul(PAGE_SIZE).saturating_add(1);
        let end = page.saturating_mul(PAGE_SIZE).min(pagination.total);

        Self {
            start,
            end,
            total: pagination.total,
            prev_enabled: page > 1,
            next_enabled: page < pagination.pages,
        }
    }

    /// Range label, e.g. `11-20 / 42 találat`
    pub fn label(&self) -> String {
        format!("{}-{} / {} találat", self.start, self.end, self.total)
    }
}

/// The page the client believes is on screen.
///
/// Only a successful list response moves the cursor, and it always moves to
/// the page the server says it served. Responses are applied in the order
/// they resolve, so the last one to arrive wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollCursor {
    current_page: u32,
    last_reported: Option<Pagination>,
}

impl Default for PollCursor {
    fn default() -> Self {
        Self {
            current_page: 1,
            last_reported: None,
        }
    }
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Reconcile with a server answer and return the view to render.
    pub fn apply(&mut self, pagination: Pagination) -> PageView {
        let confirmed = pagination.page.max(1);
        if confirmed != self.current_page {
            debug!(from = self.current_page, to = confirmed, "Cursor moved");
        }
        self.current_page = confirmed;
        self.last_reported = Some(pagination);
        PageView::from_pagination(&pagination)
    }

    /// Page to request for "previous", if there is one.
    pub fn previous_page(&self) -> Option<u32> {
        (self.current_page > 1).then(|| self.current_page - 1)
    }

    /// Page to request for "next". Before the first answer there is no
    /// known page count, so the next page is always offered.
    pub fn next_page(&self) -> Option<u32> {
        match self.last_reported {
            Some(p) if self.current_page >= p.pages => None,
            _ => self.current_page.checked_add(1),
        }
    }
}
