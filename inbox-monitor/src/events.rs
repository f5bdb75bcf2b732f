use crate::pagination::PageView;
use crate::state::{EmailSummary, Stats};
use std::time::Duration;

/// How long an error banner stays up before it dismisses itself
pub const ERROR_BANNER_TTL: Duration = Duration::from_millis(5000);

/// User actions fed into the scheduler
///
/// Delete confirmation is the front end's job; by the time a
/// `DeleteEmail` arrives here the user has already said yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextPage,
    PreviousPage,
    GoToPage(u32),
    DeleteEmail(i64),
    /// Run a poll cycle now instead of waiting for the countdown
    CheckNow,
}

/// Identifies one progress banner so the front end can take it down again
pub type BannerId = u64;

/// Everything the scheduler tells its front end
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Value to show in the "next refresh" slot
    Countdown(i32),

    /// Email table replaced with a freshly loaded page
    EmailsLoaded {
        emails: Vec<EmailSummary>,
        view: PageView,
    },

    StatsUpdated(Stats),

    /// An operation started; show `message` until the matching `ProgressDone`
    Progress { id: BannerId, message: String },

    ProgressDone { id: BannerId },

    /// Something failed; show `message` for `dismiss_after`
    Error {
        message: String,
        dismiss_after: Duration,
    },
}
