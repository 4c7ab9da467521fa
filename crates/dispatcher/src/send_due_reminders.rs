use crate::shared::usecase::UseCase;
use tracing::{error, info, warn};
use vaccine_reminder_domain::{VaccineReminder, ID};
use vaccine_reminder_infra::{PushMessage, PushNotification, ReminderContext};

pub const NOTIFICATION_TITLE: &str = "Reminder Vaksin";

/// Scans for due, unnotified reminders and pushes a notification for each.
/// One execution corresponds to one scheduler tick.
#[derive(Debug)]
pub struct SendDueRemindersUseCase;

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

/// Summary of a single dispatcher run, for logging and tests. The externally
/// visible effects are the push sends and the `notified` updates.
#[derive(Debug, Default)]
pub struct SendDueRemindersResponse {
    /// Reminders that were pushed and claimed by this run
    pub notified: Vec<VaccineReminder>,
    /// Reminders for which the send or the update failed; they stay due and
    /// are retried on the next tick
    pub failed: Vec<ID>,
    /// Reminders without a delivery token; nothing was sent for these
    pub skipped_missing_token: Vec<ID>,
}

fn notification_for(reminder: &VaccineReminder) -> PushNotification {
    PushNotification {
        title: NOTIFICATION_TITLE.to_string(),
        body: format!("Vaksin {} adalah hari ini!", reminder.vaccine_name),
    }
}

#[async_trait::async_trait]
impl UseCase for SendDueRemindersUseCase {
    type Response = SendDueRemindersResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDueReminders";

    /// This will run every minute
    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_timestamp_millis();
        info!("Checking vaccine reminders at: {}", now);

        let due_reminders = ctx
            .repos
            .reminders
            .find_due(now)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        if due_reminders.is_empty() {
            info!("No pending reminders.");
            return Ok(Default::default());
        }

        let mut res = SendDueRemindersResponse::default();

        // Sequential on purpose. A failure for one reminder must not abort
        // the rest of the batch.
        for reminder in due_reminders {
            let token = match &reminder.fcm_token {
                Some(token) => token.clone(),
                None => {
                    warn!(
                        "Reminder: {} has no fcm token registered, skipping it.",
                        reminder.id
                    );
                    res.skipped_missing_token.push(reminder.id.clone());
                    continue;
                }
            };

            let message = PushMessage {
                token,
                notification: notification_for(&reminder),
            };
            if let Err(e) = ctx.push_service.send(&message).await {
                error!(
                    "Error sending notification for reminder: {}. Error message: {:?}",
                    reminder.id, e
                );
                res.failed.push(reminder.id.clone());
                continue;
            }

            match ctx.repos.reminders.mark_notified(&reminder.id).await {
                Ok(true) => {
                    info!("Notification sent for {}", reminder.vaccine_name);
                    res.notified.push(reminder);
                }
                Ok(false) => {
                    // Lost the claim to an overlapping dispatcher which
                    // already marked this reminder. The device may have
                    // received the notification twice.
                    warn!(
                        "Reminder: {} was already marked notified by another dispatcher.",
                        reminder.id
                    );
                }
                Err(e) => {
                    error!(
                        "Error marking reminder: {} as notified. Error message: {:?}",
                        reminder.id, e
                    );
                    res.failed.push(reminder.id.clone());
                }
            }
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use std::sync::Arc;
    use vaccine_reminder_infra::{IReminderRepo, ISys, InMemoryPushService, InMemoryReminderRepo};

    struct StaticTimeSys {
        now: i64,
    }
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.now
        }
    }

    struct TestContext {
        ctx: ReminderContext,
        push_service: Arc<InMemoryPushService>,
    }

    fn setup(now: i64) -> TestContext {
        let push_service = Arc::new(InMemoryPushService::new());
        let mut ctx = ReminderContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys { now });
        ctx.push_service = push_service.clone();
        TestContext { ctx, push_service }
    }

    /// Like `setup`, but hands back the concrete reminder repo so tests can
    /// inject storage failures
    fn setup_with_repo(now: i64) -> (TestContext, Arc<InMemoryReminderRepo>) {
        let reminders = Arc::new(InMemoryReminderRepo::new());
        let TestContext {
            mut ctx,
            push_service,
        } = setup(now);
        ctx.repos.reminders = reminders.clone();
        (TestContext { ctx, push_service }, reminders)
    }

    const NOW: i64 = 1000 * 60 * 60 * 24;

    #[tokio::test]
    async fn it_notifies_due_reminders_and_marks_them() {
        let TestContext { ctx, push_service } = setup(NOW);
        let reminder = VaccineReminder::new("BCG", NOW - 1000, Some("device-1".into()));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(res.notified.len(), 1);
        assert!(res.failed.is_empty());

        let sent = push_service.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "device-1");
        assert_eq!(sent[0].notification.title, NOTIFICATION_TITLE);
        assert!(sent[0].notification.body.contains("BCG"));

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert!(stored.notified);
    }

    #[tokio::test]
    async fn it_does_not_notify_future_reminders() {
        let TestContext { ctx, push_service } = setup(NOW);
        // BCG was due yesterday, Polio is due tomorrow
        let due = VaccineReminder::new("BCG", NOW - 1000 * 60 * 60 * 24, Some("t1".into()));
        let future = VaccineReminder::new("Polio", NOW + 1000 * 60 * 60 * 24, Some("t2".into()));
        ctx.repos.reminders.insert(&due).await.unwrap();
        ctx.repos.reminders.insert(&future).await.unwrap();

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(res.notified.len(), 1);
        assert_eq!(res.notified[0].id, due.id);
        assert_eq!(push_service.sent_messages().len(), 1);

        let untouched = ctx.repos.reminders.find(&future.id).await.unwrap();
        assert!(!untouched.notified);
    }

    #[tokio::test]
    async fn it_never_renotifies_marked_reminders() {
        let TestContext { ctx, push_service } = setup(NOW);
        let reminder = VaccineReminder::new("BCG", NOW - 1000, Some("device-1".into()));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();

        assert!(res.notified.is_empty());
        assert_eq!(push_service.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn it_skips_reminders_without_a_token() {
        let TestContext { ctx, push_service } = setup(NOW);
        let reminder = VaccineReminder::new("BCG", NOW - 1000, None);
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert!(res.notified.is_empty());
        assert_eq!(res.skipped_missing_token, vec![reminder.id.clone()]);
        assert!(push_service.sent_messages().is_empty());

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert!(!stored.notified);
    }

    #[tokio::test]
    async fn a_failed_send_does_not_affect_other_reminders() {
        let TestContext { ctx, push_service } = setup(NOW);
        let failing = VaccineReminder::new("BCG", NOW - 2000, Some("broken".into()));
        let healthy = VaccineReminder::new("Polio", NOW - 1000, Some("device-2".into()));
        ctx.repos.reminders.insert(&failing).await.unwrap();
        ctx.repos.reminders.insert(&healthy).await.unwrap();
        push_service.reject_token("broken");

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(res.failed, vec![failing.id.clone()]);
        assert_eq!(res.notified.len(), 1);
        assert_eq!(res.notified[0].id, healthy.id);

        let failed = ctx.repos.reminders.find(&failing.id).await.unwrap();
        assert!(!failed.notified);
        let notified = ctx.repos.reminders.find(&healthy.id).await.unwrap();
        assert!(notified.notified);
    }

    #[tokio::test]
    async fn a_failed_send_is_retried_on_the_next_run() {
        let TestContext { ctx, push_service } = setup(NOW);
        let reminder = VaccineReminder::new("BCG", NOW - 1000, Some("flaky".into()));
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        push_service.reject_token("flaky");
        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(res.failed.len(), 1);

        let push_service = Arc::new(InMemoryPushService::new());
        let mut ctx = ReminderContext {
            push_service: push_service.clone(),
            ..ctx
        };
        ctx.sys = Arc::new(StaticTimeSys { now: NOW + 1000 * 60 });

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert_eq!(res.notified.len(), 1);
        assert_eq!(push_service.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn a_failing_due_query_ends_the_run_with_a_storage_error() {
        let (TestContext { ctx, push_service }, reminders) = setup_with_repo(NOW);
        let reminder = VaccineReminder::new("BCG", NOW - 1000, Some("device-1".into()));
        reminders.insert(&reminder).await.unwrap();
        reminders.break_find_due();

        let res = execute(SendDueRemindersUseCase, &ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::StorageError);
        assert!(push_service.sent_messages().is_empty());

        let stored = ctx.repos.reminders.find(&reminder.id).await.unwrap();
        assert!(!stored.notified);
    }

    #[tokio::test]
    async fn a_failed_mark_is_recorded_and_the_batch_continues() {
        let (TestContext { ctx, push_service }, reminders) = setup_with_repo(NOW);
        let first = VaccineReminder::new("BCG", NOW - 2000, Some("device-1".into()));
        let second = VaccineReminder::new("Polio", NOW - 1000, Some("device-2".into()));
        reminders.insert(&first).await.unwrap();
        reminders.insert(&second).await.unwrap();
        reminders.break_mark_notified();

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert!(res.notified.is_empty());
        assert_eq!(res.failed.len(), 2);
        assert!(res.failed.contains(&first.id));
        assert!(res.failed.contains(&second.id));
        // Both sends went out even though every mark failed
        assert_eq!(push_service.sent_messages().len(), 2);

        let stored = ctx.repos.reminders.find(&first.id).await.unwrap();
        assert!(!stored.notified);
    }

    #[tokio::test]
    async fn it_is_a_noop_when_nothing_is_due() {
        let TestContext { ctx, push_service } = setup(NOW);

        let res = execute(SendDueRemindersUseCase, &ctx).await.unwrap();
        assert!(res.notified.is_empty());
        assert!(res.failed.is_empty());
        assert!(push_service.sent_messages().is_empty());
    }
}
