use tracing::warn;

const DEFAULT_REMINDER_INTERVAL_MILLIS: i64 = 1000 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// How often the dispatcher checks for due reminders. Defaults to
    /// every 1 minute.
    pub reminder_interval_millis: i64,
}

impl Config {
    pub fn new() -> Self {
        let interval = std::env::var("REMINDER_INTERVAL_MILLIS")
            .unwrap_or_else(|_| DEFAULT_REMINDER_INTERVAL_MILLIS.to_string());
        let reminder_interval_millis = match interval.parse::<i64>() {
            Ok(millis) if millis > 0 => millis,
            _ => {
                warn!(
                    "The given REMINDER_INTERVAL_MILLIS: {} is not valid, falling back to the default interval: {}.",
                    interval, DEFAULT_REMINDER_INTERVAL_MILLIS
                );
                DEFAULT_REMINDER_INTERVAL_MILLIS
            }
        };
        Self {
            reminder_interval_millis,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
