use super::IReminderRepo;
use crate::repos::shared::mongo_repo;
use mongo_repo::MongoDocument;
use mongodb::{
    bson::doc,
    bson::{oid::ObjectId, Document},
    Collection, Database,
};
use serde::{Deserialize, Serialize};
use vaccine_reminder_domain::{VaccineReminder, ID};

pub struct MongoReminderRepo {
    collection: Collection<Document>,
}

impl MongoReminderRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("vaccine-reminders"),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for MongoReminderRepo {
    async fn insert(&self, reminder: &VaccineReminder) -> anyhow::Result<()> {
        mongo_repo::insert::<_, VaccineReminderMongo>(&self.collection, reminder).await
    }

    async fn find(&self, reminder_id: &ID) -> Option<VaccineReminder> {
        mongo_repo::find::<_, VaccineReminderMongo>(&self.collection, reminder_id.inner_ref())
            .await
    }

    async fn find_due(&self, before_inc: i64) -> anyhow::Result<Vec<VaccineReminder>> {
        let filter = doc! {
            "schedule_date": {
                "$lte": before_inc
            },
            "notified": false,
        };

        mongo_repo::find_many_by::<_, VaccineReminderMongo>(&self.collection, filter).await
    }

    async fn mark_notified(&self, reminder_id: &ID) -> anyhow::Result<bool> {
        // Matching on notified == false makes this a compare-and-swap: only
        // one of two overlapping dispatcher runs can modify the document.
        let filter = doc! {
            "_id": *reminder_id.inner_ref(),
            "notified": false,
        };
        let update = doc! {
            "$set": {
                "notified": true
            }
        };

        mongo_repo::update_one_by::<_, VaccineReminderMongo>(&self.collection, filter, update)
            .await
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct VaccineReminderMongo {
    _id: ObjectId,
    vaccine_name: String,
    schedule_date: i64,
    notified: bool,
    #[serde(default)]
    fcm_token: Option<String>,
}

impl MongoDocument<VaccineReminder> for VaccineReminderMongo {
    fn to_domain(self) -> VaccineReminder {
        VaccineReminder {
            id: ID::from(self._id),
            vaccine_name: self.vaccine_name,
            schedule_date: self.schedule_date,
            notified: self.notified,
            fcm_token: self.fcm_token,
        }
    }

    fn from_domain(reminder: &VaccineReminder) -> Self {
        Self {
            _id: *reminder.id.inner_ref(),
            vaccine_name: reminder.vaccine_name.clone(),
            schedule_date: reminder.schedule_date,
            notified: reminder.notified,
            fcm_token: reminder.fcm_token.clone(),
        }
    }
}
