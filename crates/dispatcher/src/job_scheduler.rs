use crate::send_due_reminders::SendDueRemindersUseCase;
use crate::shared::usecase::execute;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use vaccine_reminder_infra::ReminderContext;

/// Seconds from `now_millis` until the next whole minute. Used to align the
/// first dispatcher tick to a minute boundary.
pub fn secs_until_next_minute(now_millis: i64) -> u64 {
    (60 - (now_millis / 1000) % 60) as u64
}

/// Spawns the minutely reminder dispatch loop. Each tick is awaited before
/// the next one starts, so two runs never overlap within this process.
pub fn start_send_reminders_job(ctx: ReminderContext) -> JoinHandle<()> {
    tokio::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = secs_until_next_minute(now);
        sleep(Duration::from_secs(secs_to_next_run)).await;

        let tick_interval = Duration::from_millis(ctx.config.reminder_interval_millis as u64);
        let mut tick = interval(tick_interval);
        loop {
            tick.tick().await;
            let _ = execute(SendDueRemindersUseCase, &ctx).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_delay_aligns_to_the_next_minute() {
        assert_eq!(secs_until_next_minute(0), 60);
        assert_eq!(secs_until_next_minute(1000), 59);
        assert_eq!(secs_until_next_minute(50 * 1000), 10);
        assert_eq!(secs_until_next_minute(59 * 1000), 1);
        assert_eq!(secs_until_next_minute(60 * 1000), 60);
        assert_eq!(secs_until_next_minute(61 * 1000), 59);
        // sub-second part of the timestamp is ignored
        assert_eq!(secs_until_next_minute(61 * 1000 + 999), 59);
    }
}
