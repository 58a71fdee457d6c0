use std::sync::{Arc, Mutex};

use actix_web::{App, http::StatusCode, test, web};
use async_trait::async_trait;
use cdc_job::JobArgs;
use cdc_telemetry::metrics::init_metrics_handle;
use cdc_telemetry::tracing::init_test_tracing;
use cdc_trigger::launcher::{JobLauncher, LaunchError};
use cdc_trigger::metrics::register_metrics;
use cdc_trigger::routes::ErrorMessage;
use cdc_trigger::routes::events::{JOB_STARTED_MESSAGE, JobName, JobStartedResponse};
use cdc_trigger::startup::configure;
use uuid::Uuid;

const JOB_NAME: &str = "cdc-merge";

#[derive(Default)]
struct MockJobLauncher {
    launched: Mutex<Vec<JobArgs>>,
    fail: bool,
}

impl MockJobLauncher {
    fn failing() -> Self {
        Self {
            launched: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn launched(&self) -> Vec<JobArgs> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobLauncher for MockJobLauncher {
    async fn launch(&self, args: JobArgs) -> Result<Uuid, LaunchError> {
        if self.fail {
            return Err(LaunchError::Spawn {
                program: "cdc-job".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }

        self.launched.lock().unwrap().push(args);
        Ok(Uuid::new_v4())
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}

macro_rules! test_app {
    ($launcher:expr) => {{
        register_metrics();
        let launcher: Arc<dyn JobLauncher> = $launcher.clone();
        test::init_service(
            App::new()
                .configure(configure)
                .app_data(web::ThinData(init_metrics_handle().unwrap()))
                .app_data(web::Data::from(launcher))
                .app_data(web::Data::new(JobName(JOB_NAME.to_string()))),
        )
        .await
    }};
}

fn event_body(bucket: &str, key: &str) -> String {
    serde_json::json!({
        "Records": [
            { "s3": { "bucket": { "name": bucket }, "object": { "key": key } } }
        ]
    })
    .to_string()
}

#[actix_web::test]
async fn valid_event_starts_job() {
    init_test_tracing();
    let launcher = Arc::new(MockJobLauncher::default());
    let app = test_app!(launcher);

    let request = test::TestRequest::post()
        .uri("/events")
        .set_payload(event_body("landing", "people/LOAD00000001.csv"))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: JobStartedResponse = test::read_body_json(response).await;
    assert_eq!(body.message, JOB_STARTED_MESSAGE);
    assert_eq!(body.job_name, JOB_NAME);
    assert_eq!(
        launcher.launched(),
        vec![JobArgs::new("landing", "people/LOAD00000001.csv")]
    );
}

#[actix_web::test]
async fn event_without_records_is_rejected() {
    init_test_tracing();
    let launcher = Arc::new(MockJobLauncher::default());
    let app = test_app!(launcher);

    for payload in [r#"{}"#, r#"{"Records":[]}"#, "garbage"] {
        let request = test::TestRequest::post()
            .uri("/events")
            .set_payload(payload)
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorMessage = test::read_body_json(response).await;
        assert_eq!(body.error, "Invalid event structure");
    }

    assert!(launcher.launched().is_empty());
}

#[actix_web::test]
async fn event_missing_object_key_is_rejected() {
    init_test_tracing();
    let launcher = Arc::new(MockJobLauncher::default());
    let app = test_app!(launcher);

    let request = test::TestRequest::post()
        .uri("/events")
        .set_payload(r#"{"Records":[{"s3":{"bucket":{"name":"landing"},"object":{}}}]}"#)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorMessage = test::read_body_json(response).await;
    assert_eq!(body.error, "Missing key in event data: 'key'");
    assert!(launcher.launched().is_empty());
}

#[actix_web::test]
async fn launch_failure_returns_server_error() {
    init_test_tracing();
    let launcher = Arc::new(MockJobLauncher::failing());
    let app = test_app!(launcher);

    let request = test::TestRequest::post()
        .uri("/events")
        .set_payload(event_body("landing", "batch.csv"))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorMessage = test::read_body_json(response).await;
    assert!(body.error.starts_with("Error starting job: failed to spawn `cdc-job`"));
}

#[actix_web::test]
async fn health_check_and_metrics_respond() {
    init_test_tracing();
    let launcher = Arc::new(MockJobLauncher::default());
    let app = test_app!(launcher);

    let request = test::TestRequest::post()
        .uri("/events")
        .set_payload(event_body("landing", "batch.csv"))
        .to_request();
    assert!(test::call_service(&app, request).await.status().is_success());

    let request = test::TestRequest::get().uri("/health_check").to_request();
    assert_eq!(test::call_service(&app, request).await.status(), StatusCode::OK);

    let request = test::TestRequest::get().uri("/metrics").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = test::read_body(response).await;
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("cdc_trigger_events_received_total"));
    assert!(body.contains("cdc_trigger_jobs_launched_total"));
}
