use std::{net::TcpListener, sync::Arc};

use actix_web::{App, HttpServer, dev::Server, web};
use cdc_config::shared::{LauncherConfig, TriggerConfig};
use cdc_telemetry::metrics::init_metrics_handle;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::launcher::{CommandJobLauncher, InProcessJobLauncher, JobLauncher};
use crate::metrics::register_metrics;
use crate::routes::{
    events::{JobName, receive_event},
    health_check::health_check,
    metrics::metrics,
};

/// Trigger service wrapper.
pub struct Application {
    server: Server,
}

impl Application {
    /// Binds the listener and builds the server with the configured launcher.
    pub async fn build(config: TriggerConfig) -> anyhow::Result<Self> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let launcher = build_launcher(&config.launcher);
        info!(port, launcher = launcher.kind(), "trigger listening");

        let server = run(listener, config.job_name, launcher).await?;

        Ok(Self { server })
    }

    /// Runs the server until it receives a shutdown signal.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Creates the launcher described by the configuration.
pub fn build_launcher(config: &LauncherConfig) -> Arc<dyn JobLauncher> {
    match config {
        LauncherConfig::InProcess { job } => Arc::new(InProcessJobLauncher::new(job.clone())),
        LauncherConfig::Command { program } => Arc::new(CommandJobLauncher::new(program.clone())),
    }
}

/// Registers the service's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(metrics)
        .service(receive_event);
}

/// Creates the HTTP server on an already bound listener.
pub async fn run(
    listener: TcpListener,
    job_name: String,
    launcher: Arc<dyn JobLauncher>,
) -> Result<Server, anyhow::Error> {
    register_metrics();

    let prometheus_handle = web::ThinData(init_metrics_handle()?);
    let launcher: web::Data<dyn JobLauncher> = launcher.into();
    let job_name = web::Data::new(JobName(job_name));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(configure)
            .app_data(prometheus_handle.clone())
            .app_data(launcher.clone())
            .app_data(job_name.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
