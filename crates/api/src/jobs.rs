// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background jobs.
//!
//! A job carries only primitive identifiers and runs exactly one interactor.
//! Enqueueing is idempotent: a payload that is already pending is not added
//! a second time. A job whose interactor fails with an infrastructure error
//! is retried with a polynomial backoff until `max_attempts` is reached; a
//! job whose interactor returns a failed outcome is not retried. Every
//! failure is recorded as an [`AsyncJobLog`](clark::AsyncJobLog).

use std::sync::Mutex;

use clark::{
    CoreError, ExpireOffers, Finalization, NewAsyncJobLog, Outcome, RecalculatePaybackPoints,
};
use clark_audit::Cause;
use clark_domain::InquiryId;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error, info, warn};

use crate::services::Services;

/// Attempts a job gets before it is dropped.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// How often the worker polls for due jobs.
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

/// Background job behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    /// Attempts before a failing job is dropped.
    pub max_attempts: u32,
    /// Delay between worker polls.
    pub poll_interval: std::time::Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Errors raised by the queue itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    /// The queue mutex was poisoned by a panicking holder.
    #[error("job queue lock poisoned")]
    LockPoisoned,
    /// A job's arguments could not be encoded.
    #[error("failed to encode job arguments: {0}")]
    Encoding(String),
    /// A job run failed.
    #[error("job {job} failed on attempt {attempt}: {message}")]
    Failed {
        job: &'static str,
        attempt: u32,
        message: String,
    },
}

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobPayload {
    /// Close an inquiry whose categories all have an outcome.
    FinalizeInquiry { inquiry_id: i64 },
    /// Release due payback entries and refresh balances.
    RecalculatePaybackPoints,
    /// Expire active offers past their validity.
    ExpireOffers,
}

impl JobPayload {
    /// The job name recorded in failure logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FinalizeInquiry { .. } => "finalize_inquiry",
            Self::RecalculatePaybackPoints => "recalculate_payback_points",
            Self::ExpireOffers => "expire_offers",
        }
    }

    /// The job's arguments as JSON.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Encoding` if serialization fails.
    pub fn arguments(&self) -> Result<String, JobError> {
        serde_json::to_string(self).map_err(|err| JobError::Encoding(err.to_string()))
    }

    fn cause(&self) -> Cause {
        Cause::new(
            format!("job:{}", self.name()),
            format!("Background job {}", self.name()),
        )
    }
}

/// Delay before retry number `attempts + 1`, in the delayed-job style.
#[must_use]
pub fn retry_delay(attempts: u32) -> Duration {
    Duration::seconds(i64::from(attempts).saturating_pow(4).saturating_add(5))
}

/// A job waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub payload: JobPayload,
    /// Failed attempts so far.
    pub attempts: u32,
    /// Earliest time the job may run.
    pub run_at: OffsetDateTime,
}

/// An in-process queue of pending jobs.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<Vec<QueuedJob>>,
}

impl JobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<QueuedJob>>, JobError> {
        self.jobs.lock().map_err(|_| JobError::LockPoisoned)
    }

    /// Adds `payload` to run at `now`, unless the same payload is pending.
    ///
    /// Returns whether the job was added.
    ///
    /// # Errors
    ///
    /// Returns `JobError::LockPoisoned` if the queue is unusable.
    pub fn enqueue(&self, payload: JobPayload, now: OffsetDateTime) -> Result<bool, JobError> {
        let mut jobs = self.lock()?;
        if jobs.iter().any(|job| job.payload == payload) {
            debug!(job = payload.name(), "job already pending");
            return Ok(false);
        }
        info!(job = payload.name(), "job enqueued");
        jobs.push(QueuedJob {
            payload,
            attempts: 0,
            run_at: now,
        });
        Ok(true)
    }

    /// Returns a snapshot of the pending jobs.
    ///
    /// # Errors
    ///
    /// Returns `JobError::LockPoisoned` if the queue is unusable.
    pub fn pending(&self) -> Result<Vec<QueuedJob>, JobError> {
        Ok(self.lock()?.clone())
    }

    /// Removes and returns the earliest job due at `now`.
    ///
    /// Jobs that are not taken stay queued, so a runner that stops part-way
    /// through a pass leaves the rest for the next one.
    ///
    /// # Errors
    ///
    /// Returns `JobError::LockPoisoned` if the queue is unusable.
    pub fn take_next_due(&self, now: OffsetDateTime) -> Result<Option<QueuedJob>, JobError> {
        let mut jobs = self.lock()?;
        let next: Option<usize> = jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.run_at <= now)
            .min_by_key(|(_, job)| job.run_at)
            .map(|(index, _)| index);
        Ok(next.map(|index| jobs.remove(index)))
    }

    fn requeue(&self, job: QueuedJob) -> Result<(), JobError> {
        let mut jobs = self.lock()?;
        if !jobs.iter().any(|pending| pending.payload == job.payload) {
            jobs.push(job);
        }
        Ok(())
    }
}

/// What happened to the jobs of one [`JobRunner::run_due`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    pub succeeded: usize,
    /// Failed and scheduled again.
    pub retried: usize,
    /// Failed for the last time, or failed with an outcome that retrying cannot change.
    pub dropped: usize,
}

enum JobFailure {
    /// Infrastructure failure; another attempt may succeed.
    Retryable(String),
    /// The interactor rejected the work.
    Permanent(String),
}

fn check_outcome<P>(result: Result<Outcome<P>, CoreError>) -> Result<(), JobFailure> {
    match result {
        Ok(outcome) if outcome.successful() => Ok(()),
        Ok(outcome) => Err(JobFailure::Permanent(outcome.errors().join(", "))),
        Err(err) => Err(JobFailure::Retryable(err.to_string())),
    }
}

/// Executes due jobs against the engine's collaborators.
pub struct JobRunner<'a> {
    services: &'a Services,
}

impl<'a> JobRunner<'a> {
    #[must_use]
    pub const fn new(services: &'a Services) -> Self {
        Self { services }
    }

    /// Runs every job due at `now` once.
    ///
    /// # Errors
    ///
    /// Returns `JobError::LockPoisoned` if the queue is unusable. The job in
    /// flight is put back first; jobs not yet taken were never removed.
    pub fn run_due(&self, now: OffsetDateTime) -> Result<JobReport, JobError> {
        let mut report: JobReport = JobReport::default();
        while let Some(job) = self.services.jobs.take_next_due(now)? {
            match self.execute(&job.payload, now) {
                Ok(()) => {
                    info!(job = job.payload.name(), attempt = job.attempts + 1, "job succeeded");
                    report.succeeded += 1;
                }
                Err(failure) => match self.handle_failure(&job, failure, now) {
                    Ok(true) => report.retried += 1,
                    Ok(false) => report.dropped += 1,
                    Err(err) => {
                        if let Err(restore_err) = self.services.jobs.requeue(job.clone()) {
                            error!(
                                job = job.payload.name(),
                                error = %restore_err,
                                "job lost after failed retry bookkeeping"
                            );
                        }
                        return Err(err);
                    }
                },
            }
        }
        Ok(report)
    }

    fn execute(&self, payload: &JobPayload, now: OffsetDateTime) -> Result<(), JobFailure> {
        let services: &Services = self.services;
        match payload {
            JobPayload::FinalizeInquiry { inquiry_id } => check_outcome(
                Finalization::new(
                    services.inquiries.as_ref(),
                    services.notifier.as_ref(),
                    services.reporter.as_ref(),
                )
                .call(InquiryId::new(*inquiry_id), payload.cause()),
            ),
            JobPayload::RecalculatePaybackPoints => check_outcome(
                RecalculatePaybackPoints::new(services.payback.as_ref()).call(now),
            ),
            JobPayload::ExpireOffers => check_outcome(
                ExpireOffers::new(services.offers.as_ref()).call(now, payload.cause()),
            ),
        }
    }

    /// Records the failure and requeues the job if it may run again.
    ///
    /// Returns whether the job was requeued.
    fn handle_failure(
        &self,
        job: &QueuedJob,
        failure: JobFailure,
        now: OffsetDateTime,
    ) -> Result<bool, JobError> {
        let attempt: u32 = job.attempts + 1;
        let (message, retryable): (String, bool) = match failure {
            JobFailure::Retryable(message) => (message, true),
            JobFailure::Permanent(message) => (message, false),
        };
        let error: JobError = JobError::Failed {
            job: job.payload.name(),
            attempt,
            message: message.clone(),
        };
        warn!(job = job.payload.name(), attempt, error = %message, "job failed");
        self.services.reporter.capture("background job", &error);

        let arguments: String = job
            .payload
            .arguments()
            .unwrap_or_else(|_| format!("{:?}", job.payload));
        let log: NewAsyncJobLog = NewAsyncJobLog {
            job_name: job.payload.name().to_string(),
            arguments,
            attempt,
            error: message,
        };
        if let Err(err) = self.services.job_log.record_job_failure(log) {
            self.services.reporter.capture("job failure log", &err);
        }

        if !retryable || attempt >= self.services.config.jobs.max_attempts {
            warn!(job = job.payload.name(), attempt, "job dropped");
            return Ok(false);
        }
        let run_at: OffsetDateTime = now + retry_delay(attempt);
        debug!(job = job.payload.name(), attempt, run_at = %run_at, "job rescheduled");
        self.services.jobs.requeue(QueuedJob {
            payload: job.payload.clone(),
            attempts: attempt,
            run_at,
        })?;
        Ok(true)
    }
}
