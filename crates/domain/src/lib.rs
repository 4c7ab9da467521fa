mod reminder;
mod shared;

pub use reminder::VaccineReminder;
pub use shared::entity::{Entity, InvalidIDError, ID};
