pub mod api;
pub mod app;
pub mod companies;
pub mod config;
pub mod countdown;
pub mod error;
pub mod events;
pub mod pagination;
pub mod polling;
pub mod render;
pub mod retry;
pub mod state;

pub use api::{DashboardClient, RequestOptions};
pub use app::run;
pub use config::MonitorConfig;
pub use error::FetchError;
pub use events::{Command, DashboardEvent};
pub use polling::PollScheduler;
pub use retry::{RetryPolicy, with_retry};
