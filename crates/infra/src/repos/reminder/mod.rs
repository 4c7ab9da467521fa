mod inmemory;
mod mongo;

pub use inmemory::InMemoryReminderRepo;
pub use mongo::MongoReminderRepo;
use vaccine_reminder_domain::{VaccineReminder, ID};

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &VaccineReminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<VaccineReminder>;
    /// All reminders with a schedule date at or before `before_inc` that have
    /// not been notified yet. Order is unspecified.
    async fn find_due(&self, before_inc: i64) -> anyhow::Result<Vec<VaccineReminder>>;
    /// Conditional update of the `notified` field from `false` to `true`.
    /// Returns `true` only if this call performed the transition, so two
    /// overlapping dispatchers cannot both claim the same reminder.
    async fn mark_notified(&self, reminder_id: &ID) -> anyhow::Result<bool>;
}
