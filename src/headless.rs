//! Headless mode: print notifications to stdout instead of running the TUI.
//!
//! Every log entry from the stream becomes one line:
//!
//! ```text
//! 12:00:01.250 g1#2 api:web  select 1
//! ```
//!
//! Self-diagnostics are printed with a `--` prefix. The client's own entries
//! in the `eos` group are not printed twice.

use std::future::Future;
use std::io::Write;

use eoslog_core::Notification;
use tokio::sync::mpsc;

const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Render one notification as an output line, or `None` when it has nothing
/// to show.
pub fn format_notification(notification: &Notification) -> Option<String> {
    match notification {
        Notification::Log(message) => Some(format!("-- {message}")),
        Notification::Debug(value) => Some(format!("-- {value}")),
        Notification::NewLogEntry { entry, .. } if entry.is_internal() => None,
        Notification::NewLogEntry { entry, group } => {
            let key = entry.key();
            let mut source = key.identifier().to_string();
            for tag in key.tags() {
                source.push(':');
                source.push_str(tag);
            }
            Some(format!(
                "{} {}#{} {}  {}",
                entry.received_at().format(TIME_FORMAT),
                group.id,
                entry.index(),
                source,
                first_line(entry.message()),
            ))
        }
        Notification::Connected
        | Notification::ConnectionError
        | Notification::Disconnect
        | Notification::Cleared => None,
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

/// Print notifications to `out` until `shutdown` resolves or the channel
/// closes.
pub async fn run<W, F>(
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    mut out: W,
    shutdown: F,
) -> anyhow::Result<()>
where
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("headless shutdown requested");
                break;
            }
            notification = notifications.recv() => {
                let Some(notification) = notification else {
                    break;
                };
                if let Some(line) = format_notification(&notification) {
                    writeln!(out, "{line}")?;
                    out.flush()?;
                }
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
