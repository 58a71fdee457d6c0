use actix_web::{
    HttpResponse, Responder, ResponseError,
    http::StatusCode,
    post,
    web::{Bytes, Data, Json},
};
use cdc_job::JobArgs;
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::event::{EventError, parse_event};
use crate::launcher::{JobLauncher, LaunchError};
use crate::metrics::{
    EVENTS_RECEIVED_TOTAL, EVENTS_REJECTED_TOTAL, JOB_LAUNCH_FAILURES_TOTAL, JOBS_LAUNCHED_TOTAL,
    LAUNCHER_LABEL, REASON_LABEL,
};
use crate::routes::ErrorMessage;

/// Message returned once a job has been started.
pub const JOB_STARTED_MESSAGE: &str = "Job started successfully!";

/// Name reported for the jobs the service starts.
#[derive(Debug, Clone)]
pub struct JobName(pub String);

#[derive(Debug, Error)]
pub enum EventsError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Error starting job: {0}")]
    Launch(#[from] LaunchError),
}

impl ResponseError for EventsError {
    fn status_code(&self) -> StatusCode {
        match self {
            EventsError::Event(_) => StatusCode::BAD_REQUEST,
            EventsError::Launch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = ErrorMessage {
            error: self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(error_message)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobStartedResponse {
    pub message: String,
    pub job_name: String,
    pub run_id: Uuid,
}

/// Receives an object-created notification and starts a merge job for the object.
#[post("/events")]
pub async fn receive_event(
    body: Bytes,
    launcher: Data<dyn JobLauncher>,
    job_name: Data<JobName>,
) -> Result<impl Responder, EventsError> {
    counter!(EVENTS_RECEIVED_TOTAL).increment(1);

    let object = parse_event(&body).inspect_err(|err| {
        let reason = match err {
            EventError::InvalidStructure => "invalid_structure",
            EventError::MissingKey(_) => "missing_key",
        };
        counter!(EVENTS_REJECTED_TOTAL, REASON_LABEL => reason).increment(1);
        warn!("rejected event: {err}");
    })?;

    info!(bucket = %object.bucket, key = %object.key, "object created");

    let kind = launcher.kind();
    let run_id = launcher
        .launch(JobArgs::new(object.bucket, object.key))
        .await
        .inspect_err(|err| {
            counter!(JOB_LAUNCH_FAILURES_TOTAL, LAUNCHER_LABEL => kind).increment(1);
            error!(launcher = kind, "failed to start job: {err}");
        })?;

    counter!(JOBS_LAUNCHED_TOTAL, LAUNCHER_LABEL => kind).increment(1);
    info!(%run_id, job_name = %job_name.0, launcher = kind, "job started");

    Ok(Json(JobStartedResponse {
        message: JOB_STARTED_MESSAGE.to_string(),
        job_name: job_name.0.clone(),
        run_id,
    }))
}
