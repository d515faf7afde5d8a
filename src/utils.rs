use chrono::{DateTime, Local, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use tokio::sync::mpsc;

pub static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime")
});

pub fn spawn_async<F>(fut: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    RUNTIME.spawn(fut);
}

/// Runs `fut` on the shared runtime and delivers its output back to the event loop.
pub fn run_async_to_main<T, Fut>(tx: mpsc::UnboundedSender<T>, fut: Fut)
where
    T: Send + 'static,
    Fut: std::future::Future<Output = T> + Send + 'static,
{
    spawn_async(async move {
        let _ = tx.send(fut.await);
    });
}

pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T09:30:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Local wall-clock time for a server timestamp, or the raw text if it does not parse.
pub fn local_time(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(at) => at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        Err(_) => timestamp.to_string(),
    }
}
