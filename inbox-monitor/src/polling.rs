use crate::api::DashboardClient;
use crate::config::MonitorConfig;
use crate::countdown::{Countdown, Tick};
use crate::error::FetchError;
use crate::events::{BannerId, Command, DashboardEvent};
use crate::pagination::PollCursor;
use crate::state::{DashboardState, EmailPage};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Drives the dashboard: one tick per interval, a countdown that triggers
/// poll cycles, a periodic stats refresh, and user commands in between.
///
/// All mutable state lives here and is only touched from [`Self::run`], so
/// network responses are applied strictly in the order they resolve.
pub struct PollScheduler {
    api: DashboardClient,
    cursor: PollCursor,
    countdown: Countdown,
    state: DashboardState,

    tick_interval: Duration,
    stats_refresh_ticks: u32,
    ticks_since_stats: u32,

    banner_ttl: Duration,
    next_banner: BannerId,
    events: mpsc::UnboundedSender<DashboardEvent>,
}

impl PollScheduler {
    pub fn new(
        api: DashboardClient,
        config: &MonitorConfig,
        events: mpsc::UnboundedSender<DashboardEvent>,
    ) -> Self {
        Self {
            api,
            cursor: PollCursor::new(),
            countdown: Countdown::new(config.countdown_secs),
            state: DashboardState::new(),
            tick_interval: config.tick_interval(),
            stats_refresh_ticks: config.stats_refresh_ticks,
            ticks_since_stats: 0,
            banner_ttl: config.banner_ttl(),
            next_banner: 0,
            events,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.cursor.current_page()
    }

    pub fn countdown_remaining(&self) -> i32 {
        self.countdown.remaining()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Run until `cancel_token` fires.
    pub async fn run(
        mut self,
        cancel_token: CancellationToken,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) {
        info!(
            base_url = self.api.base_url(),
            tick_ms = self.tick_interval.as_millis() as u64,
            countdown = self.countdown.period(),
            "Poll scheduler starting"
        );

        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Shutdown signal received before initial load completed");
                return;
            }
            _ = self.initial_load() => {}
        }

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the countdown starts one interval from now.
        ticker.tick().await;

        let mut commands_open = true;
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Shutdown signal received, stopping polling gracefully");
                    break;
                }
                command = commands.recv(), if commands_open => {
                    let Some(command) = command else {
                        debug!("Command channel closed");
                        commands_open = false;
                        continue;
                    };
                    tokio::select! {
                        _ = cancel_token.cancelled() => {
                            info!(?command, "Shutdown signal received, abandoning command in flight");
                            break;
                        }
                        _ = self.handle_command(command) => {}
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel_token.cancelled() => {
                            info!("Shutdown signal received, abandoning tick in flight");
                            break;
                        }
                        _ = self.tick() => {}
                    }
                }
            }
        }
    }

    /// First page and stats, before the countdown starts.
    pub async fn initial_load(&mut self) {
        self.load_page(1).await;
        self.refresh_stats().await;
    }

    /// One scheduler tick: advance the countdown, then the stats sub-task.
    pub async fn tick(&mut self) {
        match self.countdown.tick() {
            Tick::Counting(shown) => self.emit(DashboardEvent::Countdown(shown)),
            Tick::Poll { shown } => {
                self.emit(DashboardEvent::Countdown(shown));
                self.poll_cycle().await;
                // The counter does not move while the cycle runs; show where it restarts.
                self.emit(DashboardEvent::Countdown(self.countdown.remaining()));
            }
        }

        if self.stats_refresh_ticks > 0 {
            self.ticks_since_stats += 1;
            if self.ticks_since_stats >= self.stats_refresh_ticks {
                self.ticks_since_stats = 0;
                self.refresh_stats().await;
            }
        }
    }

    pub async fn handle_command(&mut self, command: Command) {
        debug!(?command, current_page = self.cursor.current_page(), "Command received");

        match command {
            Command::NextPage => {
                if let Some(page) = self.cursor.next_page() {
                    self.load_page(page).await;
                }
            }
            Command::PreviousPage => {
                if let Some(page) = self.cursor.previous_page() {
                    self.load_page(page).await;
                }
            }
            Command::GoToPage(page) => self.load_page(page.max(1)).await,
            Command::DeleteEmail(id) => self.delete_email(id).await,
            Command::CheckNow => {
                self.countdown.reset();
                self.poll_cycle().await;
                self.emit(DashboardEvent::Countdown(self.countdown.remaining()));
            }
        }
    }

    /// Ask the backend to check the mailbox, reload the first page and the stats.
    async fn poll_cycle(&mut self) {
        let banner = self.begin_progress("Új e-mailek ellenőrzése...");
        let result = self.check_and_reload().await;
        self.end_progress(banner);

        if let Err(e) = result {
            error!(error = %e, category = e.category(), "Failed to check latest email");
            self.report(
                e,
                "Nem sikerült ellenőrizni az új e-maileket. Újrapróbálkozás folyamatban...",
            );
        }
    }

    async fn check_and_reload(&mut self) -> Result<(), FetchError> {
        let new_mail = self.api.check_latest().await?;
        info!(new_mail, "Mailbox checked");

        let page = self.api.list_emails(1).await?;
        self.show_page(page);
        self.refresh_stats().await;
        Ok(())
    }

    async fn load_page(&mut self, page: u32) {
        match self.api.list_emails(page).await {
            Ok(loaded) => self.show_page(loaded),
            Err(e) => {
                error!(error = %e, requested_page = page, "Failed to load emails");
                self.report(e, "Nem sikerült betölteni az e-maileket");
            }
        }
    }

    fn show_page(&mut self, page: EmailPage) {
        let view = self.cursor.apply(page.pagination);
        info!(
            page = self.cursor.current_page(),
            rows = page.data.len(),
            range = %view.label(),
            "Email page loaded"
        );
        self.state.update_page(page.data.clone(), view.clone());
        self.emit(DashboardEvent::EmailsLoaded {
            emails: page.data,
            view,
        });
    }

    async fn refresh_stats(&mut self) {
        let banner = self.begin_progress("Statisztikák frissítése...");
        let result = self.api.stats().await;
        self.end_progress(banner);

        match result {
            Ok(stats) => {
                debug!(?stats, "Stats refreshed");
                self.state.update_stats(stats);
                self.emit(DashboardEvent::StatsUpdated(stats));
            }
            Err(e @ FetchError::Application(_)) => {
                error!(error = %e, "Stats request rejected");
                self.report(e, "Hiba történt a statisztikák frissítésekor");
            }
            Err(e) => {
                error!(error = %e, "Error updating stats");
                self.report(
                    e,
                    "Nem sikerült frissíteni a statisztikákat. Újrapróbálkozás folyamatban...",
                );
            }
        }
    }

    async fn delete_email(&mut self, id: i64) {
        let banner = self.begin_progress("E-mail törlése...");
        let result = self.api.delete_email(id).await;
        self.end_progress(banner);

        match result {
            Ok(()) => {
                info!(id, "Email deleted");
                self.load_page(self.cursor.current_page()).await;
                self.refresh_stats().await;
            }
            Err(e @ FetchError::Application(_)) => {
                error!(id, error = %e, "Delete rejected");
                self.report(e, "Hiba történt az e-mail törlése közben");
            }
            Err(e) => {
                error!(id, error = %e, "Error deleting email");
                self.report(e, "Nem sikerült törölni az e-mailt. Kérjük, próbálja újra később.");
            }
        }
    }

    /// Record the error and show a banner. A rejection's own message wins over the fallback.
    fn report(&mut self, error: FetchError, fallback: &str) {
        let message = error
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        self.state.update_error(error);
        self.emit(DashboardEvent::Error {
            message,
            dismiss_after: self.banner_ttl,
        });
    }

    fn begin_progress(&mut self, message: &str) -> BannerId {
        self.next_banner += 1;
        let id = self.next_banner;
        self.emit(DashboardEvent::Progress {
            id,
            message: message.to_string(),
        });
        id
    }

    fn end_progress(&mut self, id: BannerId) {
        self.emit(DashboardEvent::ProgressDone { id });
    }

    fn emit(&self, event: DashboardEvent) {
        // A closed front end is not an error for the scheduler.
        let _ = self.events.send(event);
    }
}
