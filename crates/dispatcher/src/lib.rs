mod job_scheduler;
mod send_due_reminders;
mod shared;

pub use job_scheduler::{secs_until_next_minute, start_send_reminders_job};
pub use send_due_reminders::{
    SendDueRemindersResponse, SendDueRemindersUseCase, UseCaseError, NOTIFICATION_TITLE,
};
pub use shared::usecase::{execute, UseCase};
