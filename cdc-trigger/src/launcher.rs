//! Starting merge jobs for received objects.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cdc_config::shared::{JobConfig, ValidationError};
use cdc_job::{JobArgs, JobError, run_job};
use metrics::counter;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::metrics::{JOB_RUNS_FAILED_TOTAL, LAUNCHER_LABEL};

/// Argument naming the key of the object to process.
pub const KEY_ARG: &str = "--s3_target_path_key";
/// Argument naming the bucket of the object to process.
pub const BUCKET_ARG: &str = "--s3_target_path_bucket";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("invalid job arguments: {0}")]
    InvalidArgs(#[source] JobError),

    #[error("invalid job configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("failed to spawn `{}`: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Starts a merge job without waiting for it to finish.
///
/// Implementations run at most one job at a time, since every job rewrites the
/// same snapshot.
#[async_trait]
pub trait JobLauncher: Send + Sync {
    /// Starts a job for `args` and returns the id of the run.
    async fn launch(&self, args: JobArgs) -> Result<Uuid, LaunchError>;

    /// Short name of the launcher, used in logs and metric labels.
    fn kind(&self) -> &'static str;
}

/// Runs jobs inside the trigger process on tokio's blocking pool.
///
/// Runs are serialized on a lock shared by all clones of the launcher.
#[derive(Debug, Clone)]
pub struct InProcessJobLauncher {
    config: JobConfig,
    running: Arc<Mutex<()>>,
}

impl InProcessJobLauncher {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            running: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl JobLauncher for InProcessJobLauncher {
    async fn launch(&self, args: JobArgs) -> Result<Uuid, LaunchError> {
        self.config.validate()?;
        args.input_location().map_err(LaunchError::InvalidArgs)?;

        let run_id = Uuid::new_v4();
        let config = self.config.clone();
        let running = self.running.clone();
        let kind = self.kind();

        tokio::task::spawn_blocking(move || {
            let _running = running.lock().unwrap_or_else(|p| p.into_inner());

            match run_job(&config, &args) {
                Ok(report) => info!(
                    %run_id,
                    kind = ?report.kind,
                    records = report.records_written,
                    "job run succeeded"
                ),
                Err(err) => {
                    error!(
                        %run_id,
                        bucket = %args.bucket,
                        key = %args.key,
                        "job run failed: {err}"
                    );
                    counter!(JOB_RUNS_FAILED_TOTAL, LAUNCHER_LABEL => kind).increment(1);
                }
            }
        });

        Ok(run_id)
    }

    fn kind(&self) -> &'static str {
        "in_process"
    }
}

/// Runs every job as a separate `cdc-job` process.
///
/// A launch waits until the previous process has exited before spawning the
/// next one, so spawn failures are still reported to the caller.
#[derive(Debug, Clone)]
pub struct CommandJobLauncher {
    program: PathBuf,
    running: Arc<tokio::sync::Mutex<()>>,
}

impl CommandJobLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            running: Arc::new(tokio::sync::Mutex::new(())),
        }
    }
}

#[async_trait]
impl JobLauncher for CommandJobLauncher {
    async fn launch(&self, args: JobArgs) -> Result<Uuid, LaunchError> {
        args.input_location().map_err(LaunchError::InvalidArgs)?;

        let running = self.running.clone().lock_owned().await;
        let mut child = tokio::process::Command::new(&self.program)
            .arg(KEY_ARG)
            .arg(&args.key)
            .arg(BUCKET_ARG)
            .arg(&args.bucket)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let run_id = Uuid::new_v4();
        let kind = self.kind();

        info!(%run_id, pid = child.id(), program = %self.program.display(), "job process spawned");

        tokio::spawn(async move {
            let _running = running;
            match child.wait().await {
                Ok(status) if status.success() => info!(%run_id, "job process exited"),
                Ok(status) => {
                    error!(%run_id, %status, "job process failed");
                    counter!(JOB_RUNS_FAILED_TOTAL, LAUNCHER_LABEL => kind).increment(1);
                }
                Err(err) => {
                    error!(%run_id, "failed to wait for job process: {err}");
                    counter!(JOB_RUNS_FAILED_TOTAL, LAUNCHER_LABEL => kind).increment(1);
                }
            }
        });

        Ok(run_id)
    }

    fn kind(&self) -> &'static str {
        "command"
    }
}
