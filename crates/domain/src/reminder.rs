use crate::shared::entity::{Entity, ID};

/// A `VaccineReminder` represents a single scheduled vaccination for which
/// the owning device should receive a push notification once the schedule
/// date has passed.
///
/// Records are created by the mobile client when a vaccination schedule is
/// set. The dispatcher only ever flips `notified` from `false` to `true`,
/// never back.
#[derive(Debug, Clone, PartialEq)]
pub struct VaccineReminder {
    pub id: ID,
    /// Display name of the vaccine, interpolated into the notification body
    pub vaccine_name: String,
    /// Timestamp in millis at which the vaccine is due
    pub schedule_date: i64,
    /// Whether a notification has already been sent for this record
    pub notified: bool,
    /// Push delivery target of the owning device. Records without a token
    /// cannot be notified and are skipped by the dispatcher.
    pub fcm_token: Option<String>,
}

impl VaccineReminder {
    pub fn new(vaccine_name: &str, schedule_date: i64, fcm_token: Option<String>) -> Self {
        Self {
            id: Default::default(),
            vaccine_name: vaccine_name.to_string(),
            schedule_date,
            notified: false,
            fcm_token,
        }
    }

    /// A reminder is due when its schedule date has passed and no
    /// notification has been sent yet
    pub fn is_due(&self, now: i64) -> bool {
        self.schedule_date <= now && !self.notified
    }
}

impl Entity for VaccineReminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_is_due_when_schedule_date_has_passed() {
        let reminder = VaccineReminder::new("BCG", 100, Some("token".into()));
        assert!(reminder.is_due(100));
        assert!(reminder.is_due(101));
        assert!(!reminder.is_due(99));
    }

    #[test]
    fn notified_reminder_is_never_due() {
        let mut reminder = VaccineReminder::new("Polio", 100, Some("token".into()));
        reminder.notified = true;
        assert!(!reminder.is_due(100));
        assert!(!reminder.is_due(i64::MAX));
    }
}
