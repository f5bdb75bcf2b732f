#[tokio::main]
async fn main() {
    if let Err(e) = inbox_monitor::run().await {
        eprintln!("inbox-monitor: {}", e);
        std::process::exit(1);
    }
}
