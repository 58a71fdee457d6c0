//! Merge job binary.
//!
//! Started by the trigger with the bucket and key of the object that arrived,
//! loads the job configuration and processes that object.

use cdc_config::load_config;
use cdc_config::shared::JobConfig;
use cdc_job::{JobArgs, JobError, JobResult, StorageLocation, run_job};
use cdc_telemetry::tracing::init_tracing;
use clap::{ArgGroup, Parser};
use tracing::{error, info, warn};

/// CDC Job - Applies an initial load or a change batch to the snapshot.
#[derive(Parser, Debug)]
#[command(name = "cdc-job")]
#[command(about = "Applies an initial load or a change batch to the CDC snapshot")]
#[command(group(ArgGroup::new("object").required(true).args(["input", "bucket"])))]
struct Args {
    /// Bucket of the object to process.
    #[arg(
        long = "s3_target_path_bucket",
        alias = "s3-target-path-bucket",
        requires = "key"
    )]
    bucket: Option<String>,

    /// Key of the object to process.
    #[arg(
        long = "s3_target_path_key",
        alias = "s3-target-path-key",
        requires = "bucket"
    )]
    key: Option<String>,

    /// Object to process as a URI, e.g. `s3a://bucket/key`.
    #[arg(long, conflicts_with_all = ["bucket", "key"])]
    input: Option<StorageLocation>,
}

impl Args {
    fn job_args(self) -> JobResult<JobArgs> {
        match (self.input, self.bucket, self.key) {
            (Some(input), _, _) => Ok(input.into()),
            (None, Some(bucket), Some(key)) => Ok(JobArgs::new(bucket, key)),
            _ => Err(JobError::InvalidLocation(
                "no object to process was given".to_string(),
            )),
        }
    }
}

fn main() -> JobResult<()> {
    let args = Args::parse();

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    let config = load_config::<JobConfig>()?;
    config.validate()?;

    let job_args = args.job_args()?;
    match run_job(&config, &job_args) {
        Ok(report) => {
            info!(
                kind = ?report.kind,
                input = %report.input,
                snapshot = %report.snapshot,
                records = report.records_written,
                "job finished"
            );
            match serde_json::to_string(&report) {
                Ok(json) => info!(report = %json, "job report"),
                Err(err) => warn!("failed to serialize job report: {err}"),
            }
            Ok(())
        }
        Err(err) => {
            error!(bucket = %job_args.bucket, key = %job_args.key, "job failed: {err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_bucket_and_key() {
        let args = Args::try_parse_from([
            "cdc-job",
            "--s3_target_path_bucket",
            "landing",
            "--s3_target_path_key",
            "LOAD00000001.csv",
        ])
        .unwrap();

        assert_eq!(
            args.job_args().unwrap(),
            JobArgs::new("landing", "LOAD00000001.csv")
        );
    }

    #[test]
    fn test_parse_input_uri() {
        let args = Args::try_parse_from(["cdc-job", "--input", "s3a://landing/dms/batch-1.csv"])
            .unwrap();

        assert_eq!(
            args.job_args().unwrap(),
            JobArgs::new("landing", "dms/batch-1.csv")
        );
    }

    #[test]
    fn test_parse_rejects_incomplete_or_invalid_objects() {
        let invalid: [&[&str]; 5] = [
            &["cdc-job"],
            &["cdc-job", "--s3_target_path_bucket", "landing"],
            &["cdc-job", "--input", "landing/batch-1.csv"],
            &["cdc-job", "--input", "s3a://../secret.csv"],
            &[
                "cdc-job",
                "--input",
                "s3a://landing/batch-1.csv",
                "--s3_target_path_key",
                "other.csv",
            ],
        ];

        for argv in invalid {
            assert!(Args::try_parse_from(argv).is_err(), "{argv:?}");
        }
    }
}
