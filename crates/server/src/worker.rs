// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background job worker.

use std::sync::Arc;
use std::time::Duration;

use clark_api::{JobPayload, JobReport, JobRunner, Services};
use time::OffsetDateTime;
use tracing::{debug, error, info};

/// Shortest accepted poll or maintenance period.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Enqueues the recurring maintenance jobs.
///
/// Both jobs are idempotent and the queue ignores payloads already pending,
/// so calling this more often than the jobs run is harmless.
pub fn schedule_maintenance(services: &Services, now: OffsetDateTime) {
    for payload in [JobPayload::ExpireOffers, JobPayload::RecalculatePaybackPoints] {
        if let Err(err) = services.jobs.enqueue(payload, now) {
            error!(error = %err, "failed to schedule maintenance job");
        }
    }
}

/// Runs every due job once and logs the result.
pub fn tick(services: &Services, now: OffsetDateTime) -> Option<JobReport> {
    match JobRunner::new(services).run_due(now) {
        Ok(report) => {
            if report == JobReport::default() {
                debug!("no jobs due");
            } else {
                info!(
                    succeeded = report.succeeded,
                    retried = report.retried,
                    dropped = report.dropped,
                    "job pass finished"
                );
            }
            Some(report)
        }
        Err(err) => {
            error!(error = %err, "job pass failed");
            None
        }
    }
}

/// Polls the queue forever.
///
/// # Arguments
///
/// * `services` - The engine collaborators
/// * `maintenance_interval` - How often recurring jobs are enqueued
pub async fn run(services: Arc<Services>, maintenance_interval: Duration) {
    let poll_interval: Duration = services.config.jobs.poll_interval.max(MIN_INTERVAL);
    let maintenance_interval: Duration = maintenance_interval.max(MIN_INTERVAL);
    info!(?poll_interval, ?maintenance_interval, "job worker started");

    let mut poll = tokio::time::interval(poll_interval);
    let mut maintenance = tokio::time::interval(maintenance_interval);
    loop {
        tokio::select! {
            _ = poll.tick() => {
                tick(&services, OffsetDateTime::now_utc());
            }
            _ = maintenance.tick() => {
                schedule_maintenance(&services, OffsetDateTime::now_utc());
            }
        }
    }
}
