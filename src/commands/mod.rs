pub mod assignments;
pub mod timetable;

use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;

use classgrid::api::client::HttpResourceApi;
use classgrid::api::memory::InMemoryApi;
use classgrid::api::ResourceApi;
use classgrid::config::Config;
use classgrid::notify::{AutoConfirm, Confirm, Notification, NotificationLevel, Notifier};

// Re-export command functions for convenience
pub use assignments::{assign, list_assignments, unassign};
pub use timetable::{add, cells, delete, move_slot, show};

/// Shared handles for one CLI invocation
pub struct Session {
    pub api: Arc<dyn ResourceApi>,
    pub notifier: Arc<dyn Notifier>,
}

impl Session {
    /// Connect to the configured backend, or the seeded demo backend
    pub fn open(config: &Config, offline: bool) -> Result<Self> {
        let api: Arc<dyn ResourceApi> = if offline {
            tracing::info!("Using in-memory demo backend");
            Arc::new(InMemoryApi::demo_week())
        } else {
            let client = HttpResourceApi::from_api_config(&config.api)?;
            tracing::info!(base_url = %client.base_url(), "Using portal backend");
            Arc::new(client)
        };

        Ok(Self {
            api,
            notifier: Arc::new(ConsoleNotifier),
        })
    }

    /// Confirmation source: `--yes` skips the prompt
    pub fn confirm(&self, assume_yes: bool) -> Arc<dyn Confirm> {
        if assume_yes {
            Arc::new(AutoConfirm(true))
        } else {
            Arc::new(StdinConfirm)
        }
    }
}

/// Prints notifications to the terminal
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(level = %notification.level, message = %notification.message, "notify");
        match notification.level {
            NotificationLevel::Success => println!("✓ {}", notification.message),
            NotificationLevel::Warning => println!("! {}", notification.message),
            NotificationLevel::Error => eprintln!("✗ {}", notification.message),
        }
    }
}

/// Asks on stdin; anything but `y`/`yes` declines
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}
