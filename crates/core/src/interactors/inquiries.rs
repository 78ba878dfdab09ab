// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inquiry interactors.

use super::{Failure, best_effort, found};
use crate::error::CoreError;
use crate::guard::fire_event;
use crate::notify::{CustomerNotifier, ErrorReporter};
use crate::outcome::Outcome;
use crate::repository::InquiryRepository;
use clark_audit::{Actor, AuditEvent, Cause};
use clark_domain::{
    CustomerId, EntityRef, Inquiry, InquiryCategory, InquiryCategoryEvent, InquiryCategoryId,
    InquiryCategoryLifecycle, InquiryCategoryState, InquiryEvent, InquiryId, InquiryLifecycle,
    InquiryState, SubcompanyId, finalization_event,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Payload of [`UpdateInquiryState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryPayload {
    pub inquiry: Inquiry,
}

/// Fires an event on an inquiry.
pub struct UpdateInquiryState<'a> {
    inquiries: &'a dyn InquiryRepository,
}

impl<'a> UpdateInquiryState<'a> {
    #[must_use]
    pub const fn new(inquiries: &'a dyn InquiryRepository) -> Self {
        Self { inquiries }
    }

    /// Fires `event` on the inquiry.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        inquiry_id: InquiryId,
        event: InquiryEvent,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<InquiryPayload>, CoreError> {
        self.run(inquiry_id, event, actor, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        inquiry_id: InquiryId,
        event: InquiryEvent,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<InquiryPayload>, Failure> {
        let inquiry: Inquiry = found(self.inquiries.find_inquiry(inquiry_id)?)?;
        let updated: Inquiry = fire_inquiry_event(self.inquiries, &inquiry, event, actor, cause)?;
        Ok(Outcome::success(InquiryPayload { inquiry: updated }))
    }
}

fn fire_inquiry_event(
    inquiries: &dyn InquiryRepository,
    inquiry: &Inquiry,
    event: InquiryEvent,
    actor: Actor,
    cause: Cause,
) -> Result<Inquiry, Failure> {
    let next: InquiryState = fire_event::<InquiryLifecycle>(Some(inquiry.state), event)?;
    let audit: AuditEvent = AuditEvent::transition(
        actor,
        cause,
        EntityRef::inquiry(inquiry.id),
        event,
        Some(inquiry.state),
        next,
    );
    let updated: Inquiry = inquiries.update_inquiry_state(inquiry, next, &audit)?;
    info!(
        inquiry_id = %inquiry.id,
        event = %event,
        from = %inquiry.state,
        to = %next,
        "inquiry state changed"
    );
    Ok(updated)
}

/// Payload of [`Finalization`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizationPayload {
    pub inquiry: Inquiry,
    /// Whether the inquiry was completed or cancelled by this call.
    pub finalized: bool,
}

/// Closes an inquiry once every category has an outcome.
pub struct Finalization<'a> {
    inquiries: &'a dyn InquiryRepository,
    notifier: &'a dyn CustomerNotifier,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> Finalization<'a> {
    #[must_use]
    pub const fn new(
        inquiries: &'a dyn InquiryRepository,
        notifier: &'a dyn CustomerNotifier,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            inquiries,
            notifier,
            reporter,
        }
    }

    /// Completes or cancels the inquiry according to its categories.
    ///
    /// An inquiry that is already closed, or that still has a category in
    /// progress, is returned unchanged with `finalized = false`. Cancelling
    /// notifies the customer.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        inquiry_id: InquiryId,
        cause: Cause,
    ) -> Result<Outcome<FinalizationPayload>, CoreError> {
        self.run(inquiry_id, cause).or_else(Failure::into_result)
    }

    fn run(
        &self,
        inquiry_id: InquiryId,
        cause: Cause,
    ) -> Result<Outcome<FinalizationPayload>, Failure> {
        let inquiry: Inquiry = found(self.inquiries.find_inquiry(inquiry_id)?)?;
        let event: Option<InquiryEvent> = if inquiry.state.is_open() {
            finalization_event(&inquiry.categories)
        } else {
            None
        };
        let Some(event) = event else {
            debug!(
                inquiry_id = %inquiry.id,
                state = %inquiry.state,
                "inquiry not ready to finalize"
            );
            return Ok(Outcome::success(FinalizationPayload {
                inquiry,
                finalized: false,
            }));
        };

        let updated: Inquiry = fire_inquiry_event(
            self.inquiries,
            &inquiry,
            event,
            Actor::system("inquiry_finalization"),
            cause,
        )?;
        if event == InquiryEvent::Cancel {
            best_effort(
                self.reporter,
                "inquiry_categories_cancelled notification",
                self.notifier.inquiry_categories_cancelled(&updated),
            );
        }
        Ok(Outcome::success(FinalizationPayload {
            inquiry: updated,
            finalized: true,
        }))
    }
}

/// Payload of [`UpdateInquiryCategoryState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryCategoryPayload {
    pub category: InquiryCategory,
    /// The inquiry after finalization was attempted.
    pub inquiry: Inquiry,
    pub finalized: bool,
}

/// Records an insurer's answer for one category of an inquiry.
pub struct UpdateInquiryCategoryState<'a> {
    inquiries: &'a dyn InquiryRepository,
    notifier: &'a dyn CustomerNotifier,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> UpdateInquiryCategoryState<'a> {
    #[must_use]
    pub const fn new(
        inquiries: &'a dyn InquiryRepository,
        notifier: &'a dyn CustomerNotifier,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            inquiries,
            notifier,
            reporter,
        }
    }

    /// Fires `event` on the category, then tries to finalize the inquiry.
    ///
    /// # Arguments
    ///
    /// * `inquiry_id` - The inquiry owning the category
    /// * `category_id` - The category to change
    /// * `event` - `complete` or `cancel`
    /// * `cancellation_cause` - Stored with a cancellation, ignored otherwise
    /// * `actor` - Who answered
    /// * `cause` - Why the answer was recorded
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        inquiry_id: InquiryId,
        category_id: InquiryCategoryId,
        event: InquiryCategoryEvent,
        cancellation_cause: Option<&str>,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<InquiryCategoryPayload>, CoreError> {
        self.run(
            inquiry_id,
            category_id,
            event,
            cancellation_cause,
            actor,
            cause,
        )
        .or_else(Failure::into_result)
    }

    fn run(
        &self,
        inquiry_id: InquiryId,
        category_id: InquiryCategoryId,
        event: InquiryCategoryEvent,
        cancellation_cause: Option<&str>,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<InquiryCategoryPayload>, Failure> {
        let inquiry: Inquiry = found(self.inquiries.find_inquiry(inquiry_id)?)?;
        let category: &InquiryCategory = found(inquiry.category(category_id))?;
        let next: InquiryCategoryState =
            fire_event::<InquiryCategoryLifecycle>(Some(category.state), event)?;
        let audit: AuditEvent = AuditEvent::transition(
            actor,
            cause.clone(),
            EntityRef::inquiry_category(category.id),
            event,
            Some(category.state),
            next,
        );
        let stored_cause: Option<&str> = match event {
            InquiryCategoryEvent::Cancel => cancellation_cause,
            InquiryCategoryEvent::Complete => None,
        };
        let updated: InquiryCategory = self
            .inquiries
            .update_category_state(category, next, stored_cause, &audit)?;
        info!(
            inquiry_id = %inquiry.id,
            category_id = %updated.id,
            to = %next,
            "inquiry category state changed"
        );

        let finalization: FinalizationPayload =
            match Finalization::new(self.inquiries, self.notifier, self.reporter)
                .run(inquiry.id, cause)
            {
                Ok(outcome) => outcome.into_payload().ok_or(Failure::NotFound)?,
                Err(Failure::Core(err)) => return Err(Failure::Core(err)),
                Err(other) => {
                    debug!(inquiry_id = %inquiry.id, failure = ?other, "finalization skipped");
                    let inquiry: Inquiry = found(self.inquiries.find_inquiry(inquiry.id)?)?;
                    FinalizationPayload {
                        inquiry,
                        finalized: false,
                    }
                }
            };

        Ok(Outcome::success(InquiryCategoryPayload {
            category: updated,
            inquiry: finalization.inquiry,
            finalized: finalization.finalized,
        }))
    }
}

/// Open inquiries of one insurer subcompany.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcompanyGroup {
    pub subcompany_id: SubcompanyId,
    pub inquiry_ids: Vec<InquiryId>,
    /// Idents of the group's categories still in progress.
    pub category_idents: Vec<String>,
}

/// Payload of [`SubCompanyGrouping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubCompanyGroupingPayload {
    pub groups: Vec<SubcompanyGroup>,
}

/// Groups a customer's open inquiries by subcompany.
pub struct SubCompanyGrouping<'a> {
    inquiries: &'a dyn InquiryRepository,
}

impl<'a> SubCompanyGrouping<'a> {
    #[must_use]
    pub const fn new(inquiries: &'a dyn InquiryRepository) -> Self {
        Self { inquiries }
    }

    /// Returns one group per subcompany, ordered by subcompany id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
    ) -> Result<Outcome<SubCompanyGroupingPayload>, CoreError> {
        self.run(customer_id).or_else(Failure::into_result)
    }

    fn run(&self, customer_id: CustomerId) -> Result<Outcome<SubCompanyGroupingPayload>, Failure> {
        let mut grouped: BTreeMap<SubcompanyId, SubcompanyGroup> = BTreeMap::new();
        for inquiry in self.inquiries.open_inquiries_for(customer_id)? {
            if !inquiry.state.is_open() {
                continue;
            }
            let group: &mut SubcompanyGroup = grouped
                .entry(inquiry.subcompany_id)
                .or_insert_with(|| SubcompanyGroup {
                    subcompany_id: inquiry.subcompany_id,
                    inquiry_ids: Vec::new(),
                    category_idents: Vec::new(),
                });
            group.inquiry_ids.push(inquiry.id);
            group.category_idents.extend(inquiry.open_category_idents());
        }
        Ok(Outcome::success(SubCompanyGroupingPayload {
            groups: grouped.into_values().collect(),
        }))
    }
}
