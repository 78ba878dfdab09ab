// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lifecycle interactors.
//!
//! Each interactor is built from explicit collaborators (and configuration
//! where it needs any) and exposes a single `call`. Expected failures such as
//! a missing entity, a rejected transition or a validation error come back as
//! a failed [`Outcome`]; only infrastructure failures are returned as `Err`.

mod analysis;
mod contracts;
mod inquiries;
mod offers;
mod payback;

pub use analysis::{
    ContractPayload, CustomerCancelsAnalysis, CustomerProvidesDetails, RequestCorrection,
    RequestCorrectionPayload, UpdateContractAnalysisState, UploadDocuments,
    UploadDocumentsPayload,
};
pub use contracts::{
    ContractDetailsPayload, ContractSummary, ContractsUnderAnalysisPayload, FindContractDetails,
    FindContractsUnderAnalysis,
};
pub use inquiries::{
    Finalization, FinalizationPayload, InquiryCategoryPayload, InquiryPayload, SubCompanyGrouping,
    SubCompanyGroupingPayload, SubcompanyGroup, UpdateInquiryCategoryState, UpdateInquiryState,
};
pub use offers::{
    AcceptOffer, AcceptOfferPayload, ExpireOffers, ExpireOffersPayload, MoveToSuccess,
    OpportunityPayload,
};
pub use payback::{
    CreditPaybackPoints, CreditPaybackPointsPayload, DEFAULT_LOCK_DAYS, EnrollPayback,
    EnrollPaybackPayload, PaybackConfig, RecalculatePaybackPoints, RecalculationPayload,
};

use crate::error::{CoreError, RepositoryError};
use crate::notify::ErrorReporter;
use crate::outcome::{BASE_FIELD, Outcome};
use clark_domain::{DomainError, InvalidTransition};
use tracing::warn;

/// Why an interactor stopped early.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Entity missing or not owned by the caller.
    NotFound,
    /// Input rejected; attributed to a field.
    Invalid { field: String, message: String },
    /// A guard or compare-and-set rejection.
    Rejected(String),
    /// Infrastructure failure that must propagate.
    Core(CoreError),
}

impl Failure {
    /// Converts the failure into the interactor's return value.
    pub(crate) fn into_result<P>(self) -> Result<Outcome<P>, CoreError> {
        match self {
            Self::NotFound => Ok(Outcome::not_found()),
            Self::Invalid { field, message } => Ok(Outcome::invalid(&field, &message)),
            Self::Rejected(message) => Ok(Outcome::failure(vec![message])),
            Self::Core(err) => Err(err),
        }
    }
}

impl From<RepositoryError> for Failure {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { .. } => Self::NotFound,
            RepositoryError::Validation { field, message } => Self::Invalid { field, message },
            RepositoryError::StaleState { .. } => Self::Rejected(err.to_string()),
            RepositoryError::Backend(_) => Self::Core(CoreError::Repository(err)),
        }
    }
}

impl From<InvalidTransition> for Failure {
    fn from(err: InvalidTransition) -> Self {
        Self::Rejected(err.to_string())
    }
}

impl From<DomainError> for Failure {
    fn from(err: DomainError) -> Self {
        let field: &str = match &err {
            DomainError::InvalidInteraction { field, .. } => *field,
            DomainError::InvalidPaybackNumber(_) => "payback_number",
            DomainError::InvalidPoints(_) | DomainError::BalanceOverflow { .. } => "points",
            DomainError::InvalidPagination { .. } => "page",
            DomainError::InvalidTimezone(_) => "timezone",
            _ => BASE_FIELD,
        };
        Self::Invalid {
            field: field.to_string(),
            message: err.to_string(),
        }
    }
}

/// Requires a lookup to have found something.
pub(crate) fn found<T>(value: Option<T>) -> Result<T, Failure> {
    value.ok_or(Failure::NotFound)
}

/// Logs and reports a failed best-effort side effect.
///
/// # Returns
///
/// True if the side effect succeeded.
pub(crate) fn best_effort<E: std::error::Error>(
    reporter: &dyn ErrorReporter,
    context: &str,
    result: Result<(), E>,
) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(context, error = %err, "side effect failed");
            reporter.capture(context, &err);
            false
        }
    }
}
