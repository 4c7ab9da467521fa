mod telemetry;

use telemetry::{get_subscriber, init_subscriber};
use vaccine_reminder_dispatcher::start_send_reminders_job;
use vaccine_reminder_infra::setup_context;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("vaccine_reminder".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    let _reminders_job = start_send_reminders_job(context);

    tokio::signal::ctrl_c().await
}
