use anyhow::Result;
use audit_relay::config::Settings;
use audit_relay::infrastructure::{log_messages, logging};
use audit_relay::Application;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    logging::init(&settings.logging)?;

    info!(
        environment = %settings.application.environment,
        "{}",
        log_messages::application::STARTING
    );

    let app = Application::from_settings(settings)?;
    app.run().await?;

    Ok(())
}
