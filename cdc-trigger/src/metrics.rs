use std::sync::Once;

use metrics::{Unit, describe_counter};

static REGISTER_METRICS: Once = Once::new();

pub const EVENTS_RECEIVED_TOTAL: &str = "cdc_trigger_events_received_total";
pub const EVENTS_REJECTED_TOTAL: &str = "cdc_trigger_events_rejected_total";
pub const JOBS_LAUNCHED_TOTAL: &str = "cdc_trigger_jobs_launched_total";
pub const JOB_LAUNCH_FAILURES_TOTAL: &str = "cdc_trigger_job_launch_failures_total";
pub const JOB_RUNS_FAILED_TOTAL: &str = "cdc_trigger_job_runs_failed_total";

/// Label holding the reason an event was rejected.
pub const REASON_LABEL: &str = "reason";
/// Label holding the launcher kind.
pub const LAUNCHER_LABEL: &str = "launcher";

/// Registers the trigger's metric descriptions. Safe to call more than once.
pub fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            EVENTS_RECEIVED_TOTAL,
            Unit::Count,
            "Object-created notifications received"
        );

        describe_counter!(
            EVENTS_REJECTED_TOTAL,
            Unit::Count,
            "Notifications rejected because they did not name an object"
        );

        describe_counter!(JOBS_LAUNCHED_TOTAL, Unit::Count, "Merge jobs started");

        describe_counter!(
            JOB_LAUNCH_FAILURES_TOTAL,
            Unit::Count,
            "Merge jobs that could not be started"
        );

        describe_counter!(
            JOB_RUNS_FAILED_TOTAL,
            Unit::Count,
            "Started merge jobs that ended with an error"
        );
    });
}
