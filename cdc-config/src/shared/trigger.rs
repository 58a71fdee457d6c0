use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::load::Config;
use crate::shared::{JobConfig, ValidationError};

/// HTTP listener settings of the trigger service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApplicationConfig {
    /// Host the service binds to.
    pub host: String,
    /// Port the service binds to. Zero picks a free port.
    pub port: u16,
}

/// How the trigger starts merge jobs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LauncherConfig {
    /// Run the job inside the trigger process, on a blocking thread.
    InProcess { job: JobConfig },
    /// Spawn the job binary for every event.
    Command { program: PathBuf },
}

impl LauncherConfig {
    /// Validates launcher settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            LauncherConfig::InProcess { job } => job.validate(),
            LauncherConfig::Command { program } => {
                if program.as_os_str().is_empty() {
                    return Err(ValidationError::empty("launcher.program"));
                }

                Ok(())
            }
        }
    }
}

/// Configuration of the trigger service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TriggerConfig {
    pub application: ApplicationConfig,
    /// Name reported for launched jobs.
    #[serde(default = "default_job_name")]
    pub job_name: String,
    pub launcher: LauncherConfig,
}

impl TriggerConfig {
    /// Default name of launched jobs.
    pub const DEFAULT_JOB_NAME: &'static str = "cdc-merge";

    /// Validates the trigger configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.application.host.is_empty() {
            return Err(ValidationError::empty("application.host"));
        }

        if self.job_name.is_empty() {
            return Err(ValidationError::empty("job_name"));
        }

        self.launcher.validate()
    }
}

impl Config for TriggerConfig {
    const NAME: &'static str = "trigger configuration";
}

fn default_job_name() -> String {
    TriggerConfig::DEFAULT_JOB_NAME.to_string()
}
