// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the job queue and runner.

use std::sync::Arc;

use super::helpers::{
    TestContext, create_inquiry, create_test_admin, create_test_cause, create_test_user, fixed_now,
};
use crate::error::ApiError;
use crate::handlers::{enqueue_finalize_inquiry, enqueue_offer_expiry};
use crate::jobs::{JobPayload, JobQueue, JobReport, JobRunner, retry_delay};
use clark::{InquiryRepository, JobLogRepository, RepositoryError, RepositoryResult};
use clark_audit::AuditEvent;
use clark_domain::{
    CustomerId, EntityRef, Inquiry, InquiryCategory, InquiryCategoryEvent, InquiryCategoryState,
    InquiryId, InquiryState, NewInquiry,
};
use time::Duration;

/// An inquiry store whose backend is always down.
struct BrokenInquiries;

impl BrokenInquiries {
    fn down<T>() -> RepositoryResult<T> {
        Err(RepositoryError::Backend(String::from("database is locked")))
    }
}

impl InquiryRepository for BrokenInquiries {
    fn create_inquiry(&self, _inquiry: NewInquiry) -> RepositoryResult<Inquiry> {
        Self::down()
    }

    fn find_inquiry(&self, _id: InquiryId) -> RepositoryResult<Option<Inquiry>> {
        Self::down()
    }

    fn open_inquiries_for(&self, _customer_id: CustomerId) -> RepositoryResult<Vec<Inquiry>> {
        Self::down()
    }

    fn update_inquiry_state(
        &self,
        _inquiry: &Inquiry,
        _next: InquiryState,
        _audit: &AuditEvent,
    ) -> RepositoryResult<Inquiry> {
        Self::down()
    }

    fn update_category_state(
        &self,
        _category: &InquiryCategory,
        _next: InquiryCategoryState,
        _cancellation_cause: Option<&str>,
        _audit: &AuditEvent,
    ) -> RepositoryResult<InquiryCategory> {
        Self::down()
    }
}

#[test]
fn test_retry_delay_grows_polynomially() {
    assert_eq!(retry_delay(0), Duration::seconds(5));
    assert_eq!(retry_delay(1), Duration::seconds(6));
    assert_eq!(retry_delay(2), Duration::seconds(21));
    assert_eq!(retry_delay(3), Duration::seconds(86));
}

#[test]
fn test_payload_arguments_carry_only_primitives() {
    let payload = JobPayload::FinalizeInquiry { inquiry_id: 4 };

    assert_eq!(
        payload.arguments().unwrap(),
        r#"{"job":"finalize_inquiry","inquiry_id":4}"#
    );
    assert_eq!(JobPayload::ExpireOffers.name(), "expire_offers");
}

#[test]
fn test_enqueue_ignores_pending_duplicate() {
    let queue = JobQueue::new();

    assert!(queue
        .enqueue(JobPayload::RecalculatePaybackPoints, fixed_now())
        .unwrap());
    assert!(!queue
        .enqueue(JobPayload::RecalculatePaybackPoints, fixed_now())
        .unwrap());
    assert!(queue.enqueue(JobPayload::ExpireOffers, fixed_now()).unwrap());
    assert_eq!(queue.pending().unwrap().len(), 2);
}

#[test]
fn test_take_next_due_leaves_future_jobs() {
    let queue = JobQueue::new();
    queue
        .enqueue(JobPayload::ExpireOffers, fixed_now() + Duration::minutes(5))
        .unwrap();
    queue
        .enqueue(JobPayload::RecalculatePaybackPoints, fixed_now())
        .unwrap();

    let due = queue.take_next_due(fixed_now()).unwrap().unwrap();

    assert_eq!(due.payload, JobPayload::RecalculatePaybackPoints);
    assert!(queue.take_next_due(fixed_now()).unwrap().is_none());
    assert_eq!(queue.pending().unwrap().len(), 1);
}

#[test]
fn test_take_next_due_keeps_untaken_due_jobs_queued() {
    let queue = JobQueue::new();
    queue
        .enqueue(JobPayload::ExpireOffers, fixed_now() - Duration::minutes(1))
        .unwrap();
    queue
        .enqueue(JobPayload::FinalizeInquiry { inquiry_id: 9 }, fixed_now())
        .unwrap();
    queue
        .enqueue(JobPayload::RecalculatePaybackPoints, fixed_now())
        .unwrap();

    let first = queue.take_next_due(fixed_now()).unwrap().unwrap();

    assert_eq!(first.payload, JobPayload::ExpireOffers);
    let pending: Vec<JobPayload> = queue
        .pending()
        .unwrap()
        .into_iter()
        .map(|job| job.payload)
        .collect();
    assert_eq!(
        pending,
        vec![
            JobPayload::FinalizeInquiry { inquiry_id: 9 },
            JobPayload::RecalculatePaybackPoints,
        ]
    );
    let second = queue.take_next_due(fixed_now()).unwrap().unwrap();
    assert_eq!(second.payload, JobPayload::FinalizeInquiry { inquiry_id: 9 });
}

#[test]
fn test_enqueue_handlers_require_admin() {
    let ctx = TestContext::new();

    let result = enqueue_offer_expiry(&ctx.services, &create_test_user(), fixed_now());

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(ctx.services.jobs.pending().unwrap().is_empty());
}

#[test]
fn test_finalize_job_closes_inquiry() {
    let ctx = TestContext::new();
    let inquiry = create_inquiry(&ctx.store, 40, InquiryState::Contacted, &["liability"]);
    let category = &inquiry.categories[0];
    let audit = AuditEvent::transition(
        create_test_admin().to_audit_actor(),
        create_test_cause(),
        EntityRef::inquiry_category(category.id),
        InquiryCategoryEvent::Complete,
        Some(category.state),
        InquiryCategoryState::Completed,
    );
    ctx.store
        .update_category_state(category, InquiryCategoryState::Completed, None, &audit)
        .unwrap();

    let response = enqueue_finalize_inquiry(
        &ctx.services,
        &create_test_admin(),
        inquiry.id.value(),
        fixed_now(),
    )
    .unwrap();
    let report = JobRunner::new(&ctx.services).run_due(fixed_now()).unwrap();

    assert!(response.enqueued);
    assert_eq!(response.job, "finalize_inquiry");
    assert_eq!(
        report,
        JobReport {
            succeeded: 1,
            retried: 0,
            dropped: 0
        }
    );
    assert_eq!(
        ctx.store.find_inquiry(inquiry.id).unwrap().unwrap().state,
        InquiryState::Completed
    );
    assert!(ctx.store.job_failures().unwrap().is_empty());
}

#[test]
fn test_backend_failure_is_retried_with_backoff() {
    let mut ctx = TestContext::new();
    ctx.services.inquiries = Arc::new(BrokenInquiries);
    enqueue_finalize_inquiry(&ctx.services, &create_test_admin(), 5, fixed_now()).unwrap();

    let report = JobRunner::new(&ctx.services).run_due(fixed_now()).unwrap();

    assert_eq!(report.retried, 1);
    let pending = ctx.services.jobs.pending().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 1);
    assert_eq!(pending[0].run_at, fixed_now() + Duration::seconds(6));

    let failures = ctx.store.job_failures().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].job_name, "finalize_inquiry");
    assert_eq!(failures[0].attempt, 1);
}

#[test]
fn test_job_is_dropped_after_max_attempts() {
    let mut ctx = TestContext::new();
    ctx.services.inquiries = Arc::new(BrokenInquiries);
    enqueue_finalize_inquiry(&ctx.services, &create_test_admin(), 5, fixed_now()).unwrap();

    let runner = JobRunner::new(&ctx.services);
    let mut now = fixed_now();
    let mut dropped = 0;
    for _ in 0..ctx.services.config.jobs.max_attempts {
        dropped += runner.run_due(now).unwrap().dropped;
        now += Duration::hours(1);
    }

    assert_eq!(dropped, 1);
    assert!(ctx.services.jobs.pending().unwrap().is_empty());
    let attempts: Vec<u32> = ctx
        .store
        .job_failures()
        .unwrap()
        .iter()
        .map(|log| log.attempt)
        .collect();
    assert_eq!(attempts, vec![1, 2, 3, 4]);
}

#[test]
fn test_failed_outcome_is_not_retried() {
    let ctx = TestContext::new();
    enqueue_finalize_inquiry(&ctx.services, &create_test_admin(), 404, fixed_now()).unwrap();

    let report = JobRunner::new(&ctx.services).run_due(fixed_now()).unwrap();

    assert_eq!(report.dropped, 1);
    assert!(ctx.services.jobs.pending().unwrap().is_empty());
    assert_eq!(ctx.store.job_failures().unwrap().len(), 1);
}
