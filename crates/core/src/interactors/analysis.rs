// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Interactors driving a contract's analysis sub-lifecycle.

use super::{Failure, best_effort, found};
use crate::error::CoreError;
use crate::guard::fire_event;
use crate::notify::{CustomerNotifier, ErrorReporter};
use crate::outcome::Outcome;
use crate::repository::{ContractRepository, InteractionRepository};
use clark_audit::{Actor, AuditEvent, Cause};
use clark_domain::{
    AdminId, AnalysisEvent, AnalysisLifecycle, AnalysisState, Contract, ContractId, CustomerId,
    Document, DocumentUpload, EntityRef, NewInteraction,
};
use serde::Serialize;
use tracing::{debug, info};

/// Payload of interactors that return the updated contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractPayload {
    pub contract: Contract,
}

/// Fires `event` on the contract's analysis state and persists the result.
fn fire_analysis_event(
    contracts: &dyn ContractRepository,
    contract: &Contract,
    event: AnalysisEvent,
    actor: Actor,
    cause: Cause,
) -> Result<Contract, Failure> {
    let next: AnalysisState = fire_event::<AnalysisLifecycle>(contract.analysis_state, event)?;
    let audit: AuditEvent = AuditEvent::transition(
        actor,
        cause,
        EntityRef::contract(contract.id),
        event,
        contract.analysis_state,
        next,
    );
    let updated: Contract = contracts.update_analysis_state(contract, next, &audit)?;
    info!(
        contract_id = %contract.id,
        event = %event,
        from = contract.analysis_state.map_or("nil", |s| s.as_str()),
        to = %next,
        "analysis state changed"
    );
    Ok(updated)
}

/// Fires any analysis event on a contract on behalf of an admin or a job.
pub struct UpdateContractAnalysisState<'a> {
    contracts: &'a dyn ContractRepository,
    notifier: &'a dyn CustomerNotifier,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> UpdateContractAnalysisState<'a> {
    #[must_use]
    pub const fn new(
        contracts: &'a dyn ContractRepository,
        notifier: &'a dyn CustomerNotifier,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            contracts,
            notifier,
            reporter,
        }
    }

    /// Fires `event` and tells the customer about the new state.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        contract_id: ContractId,
        event: AnalysisEvent,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, CoreError> {
        self.run(contract_id, event, actor, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        contract_id: ContractId,
        event: AnalysisEvent,
        actor: Actor,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, Failure> {
        let contract: Contract = found(self.contracts.find_contract(contract_id)?)?;
        let updated: Contract =
            fire_analysis_event(self.contracts, &contract, event, actor, cause)?;
        best_effort(
            self.reporter,
            "analysis_state_changed notification",
            self.notifier.analysis_state_changed(&updated),
        );
        Ok(Outcome::success(ContractPayload { contract: updated }))
    }
}

/// The customer fills in the missing details of a contract themselves.
pub struct CustomerProvidesDetails<'a> {
    contracts: &'a dyn ContractRepository,
}

impl<'a> CustomerProvidesDetails<'a> {
    #[must_use]
    pub const fn new(contracts: &'a dyn ContractRepository) -> Self {
        Self { contracts }
    }

    /// Fires `customer_provides_details` on the customer's contract.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, CoreError> {
        self.run(customer_id, contract_id, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, Failure> {
        let contract: Contract =
            found(self.contracts.find_customer_contract(customer_id, contract_id)?)?;
        let updated: Contract = fire_analysis_event(
            self.contracts,
            &contract,
            AnalysisEvent::CustomerProvidesDetails,
            Actor::customer(customer_id),
            cause,
        )?;
        Ok(Outcome::success(ContractPayload { contract: updated }))
    }
}

/// The customer withdraws a contract from analysis.
pub struct CustomerCancelsAnalysis<'a> {
    contracts: &'a dyn ContractRepository,
}

impl<'a> CustomerCancelsAnalysis<'a> {
    #[must_use]
    pub const fn new(contracts: &'a dyn ContractRepository) -> Self {
        Self { contracts }
    }

    /// Fires `customer_cancels_analysis` on the customer's contract.
    ///
    /// A contract that does not exist and a contract owned by another customer
    /// both produce the same not-found outcome.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, CoreError> {
        self.run(customer_id, contract_id, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        cause: Cause,
    ) -> Result<Outcome<ContractPayload>, Failure> {
        let contract: Contract =
            found(self.contracts.find_customer_contract(customer_id, contract_id)?)?;
        let updated: Contract = fire_analysis_event(
            self.contracts,
            &contract,
            AnalysisEvent::CustomerCancelsAnalysis,
            Actor::customer(customer_id),
            cause,
        )?;
        Ok(Outcome::success(ContractPayload { contract: updated }))
    }
}

/// Payload of [`RequestCorrection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCorrectionPayload {
    pub contract: Contract,
    /// Whether the interaction record was written.
    pub interaction_recorded: bool,
    /// Whether the customer notification was delivered on some channel.
    pub customer_notified: bool,
}

/// An admin rejects a contract's documents and asks the customer for a correction.
pub struct RequestCorrection<'a> {
    contracts: &'a dyn ContractRepository,
    interactions: &'a dyn InteractionRepository,
    notifier: &'a dyn CustomerNotifier,
    reporter: &'a dyn ErrorReporter,
}

impl<'a> RequestCorrection<'a> {
    #[must_use]
    pub const fn new(
        contracts: &'a dyn ContractRepository,
        interactions: &'a dyn InteractionRepository,
        notifier: &'a dyn CustomerNotifier,
        reporter: &'a dyn ErrorReporter,
    ) -> Self {
        Self {
            contracts,
            interactions,
            notifier,
            reporter,
        }
    }

    /// Moves the contract to `analysis_failed`, then records the interaction
    /// and notifies the customer.
    ///
    /// The interaction is built before the transition, so an empty request
    /// fails without changing state. After the state change both side effects
    /// are attempted independently; neither failure undoes the transition.
    ///
    /// # Arguments
    ///
    /// * `admin_id` - The requesting admin
    /// * `contract_id` - The contract under review
    /// * `reasons` - Machine-readable correction reasons
    /// * `free_text` - Message to the customer
    /// * `cause` - The request that triggered the correction
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if loading or updating the contract
    /// fails in the backend.
    pub fn call(
        &self,
        admin_id: AdminId,
        contract_id: ContractId,
        reasons: &[String],
        free_text: &str,
        cause: Cause,
    ) -> Result<Outcome<RequestCorrectionPayload>, CoreError> {
        self.run(admin_id, contract_id, reasons, free_text, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        admin_id: AdminId,
        contract_id: ContractId,
        reasons: &[String],
        free_text: &str,
        cause: Cause,
    ) -> Result<Outcome<RequestCorrectionPayload>, Failure> {
        let contract: Contract = found(self.contracts.find_contract(contract_id)?)?;
        let interaction: NewInteraction = NewInteraction::correction_request(
            admin_id,
            contract.id,
            contract.customer_id,
            reasons,
            free_text,
        )?;

        let updated: Contract = fire_analysis_event(
            self.contracts,
            &contract,
            AnalysisEvent::FailAnalysis,
            Actor::admin(admin_id),
            cause,
        )?;

        let interaction_recorded: bool = best_effort(
            self.reporter,
            "request_correction interaction",
            self.interactions.create_interaction(interaction).map(|_| ()),
        );
        let customer_notified: bool = best_effort(
            self.reporter,
            "request_correction notification",
            self.notifier.request_correction(&updated, reasons, free_text.trim()),
        );

        Ok(Outcome::success(RequestCorrectionPayload {
            contract: updated,
            interaction_recorded,
            customer_notified,
        }))
    }
}

/// Payload of [`UploadDocuments`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadDocumentsPayload {
    pub contract: Contract,
    /// Documents created by this upload; known checksums are not repeated.
    pub documents: Vec<Document>,
    /// Whether the upload moved the contract into analysis.
    pub analysis_requested: bool,
}

/// The customer uploads documents for a contract.
pub struct UploadDocuments<'a> {
    contracts: &'a dyn ContractRepository,
}

impl<'a> UploadDocuments<'a> {
    #[must_use]
    pub const fn new(contracts: &'a dyn ContractRepository) -> Self {
        Self { contracts }
    }

    /// Stores the uploads, then fires `request_analysis` if any document is new.
    ///
    /// A rejected `request_analysis` (for example while the contract is already
    /// under analysis) does not fail the upload; the payload reports
    /// `analysis_requested = false` and the analysis state is left alone.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        uploads: &[DocumentUpload],
        cause: Cause,
    ) -> Result<Outcome<UploadDocumentsPayload>, CoreError> {
        self.run(customer_id, contract_id, uploads, cause)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
        uploads: &[DocumentUpload],
        cause: Cause,
    ) -> Result<Outcome<UploadDocumentsPayload>, Failure> {
        let contract: Contract =
            found(self.contracts.find_customer_contract(customer_id, contract_id)?)?;
        let documents: Vec<Document> = self.contracts.add_documents(contract.id, uploads)?;

        if documents.is_empty() {
            debug!(contract_id = %contract.id, "upload produced no new documents");
            return Ok(Outcome::success(UploadDocumentsPayload {
                contract,
                documents,
                analysis_requested: false,
            }));
        }

        let (contract, analysis_requested): (Contract, bool) = match fire_analysis_event(
            self.contracts,
            &contract,
            AnalysisEvent::RequestAnalysis,
            Actor::customer(customer_id),
            cause,
        ) {
            Ok(updated) => (updated, true),
            Err(Failure::Rejected(reason)) => {
                debug!(contract_id = %contract.id, reason = %reason, "analysis not requested");
                (contract, false)
            }
            Err(other) => return Err(other),
        };

        Ok(Outcome::success(UploadDocumentsPayload {
            contract,
            documents,
            analysis_requested,
        }))
    }
}
