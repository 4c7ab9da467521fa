use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use std::sync::atomic::{AtomicBool, Ordering};
use vaccine_reminder_domain::{VaccineReminder, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<VaccineReminder>>,
    broken_finds: AtomicBool,
    broken_marks: AtomicBool,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
            broken_finds: AtomicBool::new(false),
            broken_marks: AtomicBool::new(false),
        }
    }

    /// Makes every due query fail until further notice. Used in tests to
    /// exercise the storage failure path.
    pub fn break_find_due(&self) {
        self.broken_finds.store(true, Ordering::SeqCst);
    }

    /// Makes every notified update fail until further notice
    pub fn break_mark_notified(&self) {
        self.broken_marks.store(true, Ordering::SeqCst);
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &VaccineReminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<VaccineReminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_due(&self, before_inc: i64) -> anyhow::Result<Vec<VaccineReminder>> {
        if self.broken_finds.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Unable to query reminders"));
        }
        Ok(find_by(&self.reminders, |reminder| {
            reminder.is_due(before_inc)
        }))
    }

    async fn mark_notified(&self, reminder_id: &ID) -> anyhow::Result<bool> {
        if self.broken_marks.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Unable to update reminder"));
        }
        Ok(update_first(
            &self.reminders,
            |reminder| reminder.id == *reminder_id && !reminder.notified,
            |reminder| reminder.notified = true,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_due_excludes_future_and_notified_reminders() {
        let repo = InMemoryReminderRepo::new();
        let due = VaccineReminder::new("BCG", 100, Some("t1".into()));
        let future = VaccineReminder::new("Polio", 200, Some("t2".into()));
        let mut already_notified = VaccineReminder::new("DPT", 50, Some("t3".into()));
        already_notified.notified = true;

        repo.insert(&due).await.unwrap();
        repo.insert(&future).await.unwrap();
        repo.insert(&already_notified).await.unwrap();

        let found = repo.find_due(100).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, due.id);
    }

    #[tokio::test]
    async fn mark_notified_claims_a_reminder_only_once() {
        let repo = InMemoryReminderRepo::new();
        let reminder = VaccineReminder::new("BCG", 100, Some("t1".into()));
        repo.insert(&reminder).await.unwrap();

        assert!(repo.mark_notified(&reminder.id).await.unwrap());
        assert!(!repo.mark_notified(&reminder.id).await.unwrap());

        let stored = repo.find(&reminder.id).await.expect("Reminder to exist");
        assert!(stored.notified);
    }

    #[tokio::test]
    async fn mark_notified_on_unknown_id_is_a_noop() {
        let repo = InMemoryReminderRepo::new();
        assert!(!repo.mark_notified(&ID::new()).await.unwrap());
    }
}
