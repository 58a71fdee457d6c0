use anyhow::Context;
use cdc_config::load_config;
use cdc_config::shared::TriggerConfig;
use cdc_telemetry::tracing::init_tracing;
use cdc_trigger::startup::Application;
use tracing::info;

/// Entry point for the trigger service.
fn main() -> anyhow::Result<()> {
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config =
        load_config::<TriggerConfig>().context("loading trigger configuration for startup")?;
    config
        .validate()
        .context("validating trigger configuration")?;

    info!(
        host = config.application.host,
        port = config.application.port,
        job_name = config.job_name,
        "starting trigger"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
