mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{IReminderRepo, InMemoryReminderRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push_service: Arc<dyn IPushService>,
}

struct ContextParams {
    // (connection_string, db_name)
    pub mongodb: (String, String),
    pub fcm_server_key: String,
}

impl ReminderContext {
    async fn create(params: ContextParams) -> Self {
        let (connection_string, db_name) = params.mongodb;
        let repos = Repos::create_mongodb(&connection_string, &db_name)
            .await
            .expect("Mongodb credentials must be set and valid");
        Self {
            repos,
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            push_service: Arc::new(FcmPushService::new(params.fcm_server_key)),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            push_service: Arc::new(InMemoryPushService::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> ReminderContext {
    ReminderContext::create(ContextParams {
        mongodb: get_mongodb_connection(),
        fcm_server_key: get_env_var("FCM_SERVER_KEY"),
    })
    .await
}

fn get_mongodb_connection() -> (String, String) {
    let connection_string = get_env_var("MONGODB_CONNECTION_STRING");
    let db_name = std::env::var("MONGODB_DB_NAME").unwrap_or_else(|_| "vaccine-reminder".into());
    (connection_string, db_name)
}

fn get_env_var(var: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| panic!("{} env var to be present.", var))
}
