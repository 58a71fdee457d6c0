//! CDC Trigger - Starts a merge job for every object-created notification.
//!
//! The service accepts object-created notifications on `POST /events`, takes
//! the bucket and key of the first record and hands them to a
//! [`launcher::JobLauncher`]. Jobs run in the background; the response only
//! reports whether the job could be started.

pub mod event;
pub mod launcher;
pub mod metrics;
pub mod routes;
pub mod startup;
