use crate::api::DashboardClient;
use crate::config::MonitorConfig;
use crate::error::FetchError;
use crate::events::{Command, DashboardEvent};
use crate::pagination::PageView;
use crate::polling::PollScheduler;
use crate::render::{filter_rows, render_stats, render_table};
use crate::state::EmailSummary;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// What a line typed on stdin asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Delete needs a yes before it turns into a command
    ConfirmDelete(i64),
    Search(String),
    Quit,
    Unknown(String),
}

/// `n`, `p`, `g <page>`, `d <id>`, `r`, `/<term>`, `q`
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Input::Search(term.to_string());
    }

    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("n"), None) => Input::Command(Command::NextPage),
        (Some("p"), None) => Input::Command(Command::PreviousPage),
        (Some("r"), None) => Input::Command(Command::CheckNow),
        (Some("q"), None) => Input::Quit,
        (Some("g"), Some(page)) => match page.parse() {
            Ok(page) => Input::Command(Command::GoToPage(page)),
            Err(_) => Input::Unknown(line.to_string()),
        },
        (Some("d"), Some(id)) => match id.parse() {
            Ok(id) => Input::ConfirmDelete(id),
            Err(_) => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

/// Accepts the Hungarian and English yes answers
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "i" | "igen" | "y" | "yes")
}

/// Last page and search term, so a new search can re-render without a fetch
#[derive(Debug, Default)]
struct Screen {
    emails: Vec<EmailSummary>,
    view: Option<PageView>,
    search: String,
}

impl Screen {
    fn print_table(&self) {
        if let Some(view) = &self.view {
            let rows = filter_rows(&self.emails, &self.search);
            println!("{}", render_table(&rows, view));
        }
    }

    fn show(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Countdown(n) => info!("{} mp", n),
            DashboardEvent::EmailsLoaded { emails, view } => {
                self.emails = emails;
                self.view = Some(view);
                self.print_table();
            }
            DashboardEvent::StatsUpdated(stats) => println!("{}", render_stats(&stats)),
            DashboardEvent::Progress { message, .. } => info!("{}", message),
            DashboardEvent::ProgressDone { .. } => {}
            DashboardEvent::Error { message, .. } => eprintln!("! {}", message),
        }
    }
}

/// Forward typed commands to the scheduler and its events to the screen
/// until `shutdown` resolves or the user quits. Closed input only stops
/// reading; the events keep flowing.
async fn console_loop<R, S>(
    input: R,
    shutdown: S,
    mut events: mpsc::UnboundedReceiver<DashboardEvent>,
    commands: mpsc::UnboundedSender<Command>,
) where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();
    let mut screen = Screen::default();
    let mut pending_delete: Option<i64> = None;
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(event) = events.recv() => screen.show(event),
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Input closed, monitoring until Ctrl-C");
                        input_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read input, monitoring until Ctrl-C");
                        input_open = false;
                        continue;
                    }
                };

                if let Some(id) = pending_delete.take() {
                    if is_confirmation(&line) {
                        let _ = commands.send(Command::DeleteEmail(id));
                    }
                    continue;
                }

                match parse_input(&line) {
                    Input::Command(command) => {
                        let _ = commands.send(command);
                    }
                    Input::ConfirmDelete(id) => {
                        println!("Biztosan törli ezt az e-mailt? (#{}) [i/n]", id);
                        pending_delete = Some(id);
                    }
                    Input::Search(term) => {
                        screen.search = term;
                        screen.print_table();
                    }
                    Input::Quit => break,
                    Input::Unknown(line) => warn!(input = %line, "Unknown input"),
                }
            }
        }
    }
}

pub async fn run() -> Result<(), FetchError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from a .env file next to the working directory
    dotenvy::dotenv().ok();

    let config = MonitorConfig::from_env();
    info!(config = ?config, "Monitor config initialized");

    let api = DashboardClient::with_timeout(&config.base_url, config.retry, config.request_timeout())?;
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    // Create cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();
    let scheduler = PollScheduler::new(api, &config, event_tx);
    let poller = tokio::spawn(scheduler.run(cancel_token.clone(), command_rx));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        info!("Exit requested, initiating graceful shutdown");
    };
    console_loop(BufReader::new(tokio::io::stdin()), shutdown, event_rx, command_tx).await;

    cancel_token.cancel();
    if let Err(e) = poller.await {
        error!("Poll scheduler task failed: {}", e);
    }
    info!("Graceful shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{assert, let_assert};
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case("n", Input::Command(Command::NextPage))]
    #[case(" p ", Input::Command(Command::PreviousPage))]
    #[case("g 4", Input::Command(Command::GoToPage(4)))]
    #[case("r", Input::Command(Command::CheckNow))]
    #[case("d 17", Input::ConfirmDelete(17))]
    #[case("/acme kft", Input::Search("acme kft".to_string()))]
    #[case("q", Input::Quit)]
    #[case("g x", Input::Unknown("g x".to_string()))]
    #[case("", Input::Unknown(String::new()))]
    fn test_parse_input(#[case] line: &str, #[case] expected: Input) {
        assert!(parse_input(line) == expected);
    }

    #[tokio::test]
    async fn test_closed_input_keeps_monitoring_until_shutdown() {
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown = async move {
            let _ = stop_rx.await;
        };

        let input: &[u8] = b"n\n";
        let handle = tokio::spawn(console_loop(input, shutdown, event_rx, command_tx));

        let received = tokio::time::timeout(Duration::from_secs(5), command_rx.recv()).await;
        let_assert!(Ok(Some(Command::NextPage)) = received);

        // Input is at EOF now; the loop must still be waiting for shutdown.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        let _ = stop_tx.send(());
        let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
        let_assert!(Ok(Ok(())) = finished);
    }

    #[tokio::test]
    async fn test_quit_ends_loop_without_shutdown() {
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, _command_rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"q\n";

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            console_loop(input, std::future::pending::<()>(), event_rx, command_tx),
        )
        .await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, mut command_rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"d 7\nn\nd 8\nigen\nq\n";

        console_loop(input, std::future::pending::<()>(), event_rx, command_tx).await;

        let_assert!(Ok(Command::DeleteEmail(8)) = command_rx.try_recv());
        assert!(command_rx.try_recv().is_err());
    }

    #[rstest]
    #[case("i", true)]
    #[case("Igen", true)]
    #[case("y", true)]
    #[case("n", false)]
    #[case("", false)]
    fn test_confirmation(#[case] answer: &str, #[case] expected: bool) {
        assert!(is_confirmation(answer) == expected);
    }
}
