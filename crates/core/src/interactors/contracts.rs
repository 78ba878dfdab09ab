// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{Failure, found};
use crate::error::CoreError;
use crate::outcome::Outcome;
use crate::repository::ContractRepository;
use clark_domain::{
    AnalysisEstimateConfig, AnalysisState, Contract, ContractId, CustomerId, Document, Page,
    estimate_analysis_completion,
};
use serde::Serialize;
use time::OffsetDateTime;

/// A contract with its analysis estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractSummary {
    pub contract: Contract,
    #[serde(with = "time::serde::rfc3339::option")]
    pub estimated_time_to_finish_analysis: Option<OffsetDateTime>,
}

/// Payload of [`FindContractsUnderAnalysis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractsUnderAnalysisPayload {
    pub contracts: Vec<ContractSummary>,
    /// Number of matching contracts across all pages.
    pub total_count: u64,
}

/// Payload of [`FindContractDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDetailsPayload {
    pub contract: Contract,
    pub documents: Vec<Document>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub estimated_time_to_finish_analysis: Option<OffsetDateTime>,
}

fn estimate_for(
    contract: &Contract,
    documents: &[Document],
    config: &AnalysisEstimateConfig,
) -> Result<Option<OffsetDateTime>, Failure> {
    if contract.analysis_state != Some(AnalysisState::UnderAnalysis) {
        return Ok(None);
    }
    Ok(estimate_analysis_completion(documents, config)?)
}

/// Lists a customer's contracts that are under analysis.
pub struct FindContractsUnderAnalysis<'a> {
    contracts: &'a dyn ContractRepository,
    config: AnalysisEstimateConfig,
}

impl<'a> FindContractsUnderAnalysis<'a> {
    #[must_use]
    pub const fn new(
        contracts: &'a dyn ContractRepository,
        config: AnalysisEstimateConfig,
    ) -> Self {
        Self { contracts, config }
    }

    /// Returns one page of the customer's `under_analysis` contracts, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        page: Page,
    ) -> Result<Outcome<ContractsUnderAnalysisPayload>, CoreError> {
        self.run(customer_id, page).or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        page: Page,
    ) -> Result<Outcome<ContractsUnderAnalysisPayload>, Failure> {
        let (contracts, total_count): (Vec<Contract>, u64) = self
            .contracts
            .contracts_in_analysis_state(customer_id, AnalysisState::UnderAnalysis, page)?;

        let mut summaries: Vec<ContractSummary> = Vec::with_capacity(contracts.len());
        for contract in contracts {
            let documents: Vec<Document> = self.contracts.documents_for(contract.id)?;
            let estimate: Option<OffsetDateTime> =
                estimate_for(&contract, &documents, &self.config)?;
            summaries.push(ContractSummary {
                contract,
                estimated_time_to_finish_analysis: estimate,
            });
        }

        Ok(Outcome::success(ContractsUnderAnalysisPayload {
            contracts: summaries,
            total_count,
        }))
    }
}

/// Shows one of the customer's contracts with its documents.
pub struct FindContractDetails<'a> {
    contracts: &'a dyn ContractRepository,
    config: AnalysisEstimateConfig,
}

impl<'a> FindContractDetails<'a> {
    #[must_use]
    pub const fn new(
        contracts: &'a dyn ContractRepository,
        config: AnalysisEstimateConfig,
    ) -> Self {
        Self { contracts, config }
    }

    /// Loads the contract, its customer-visible documents and, while it is
    /// under analysis, the estimate.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Repository` if the backend fails.
    pub fn call(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
    ) -> Result<Outcome<ContractDetailsPayload>, CoreError> {
        self.run(customer_id, contract_id)
            .or_else(Failure::into_result)
    }

    fn run(
        &self,
        customer_id: CustomerId,
        contract_id: ContractId,
    ) -> Result<Outcome<ContractDetailsPayload>, Failure> {
        let contract: Contract =
            found(self.contracts.find_customer_contract(customer_id, contract_id)?)?;
        let documents: Vec<Document> = self.contracts.documents_for(contract.id)?;
        let estimate: Option<OffsetDateTime> = estimate_for(&contract, &documents, &self.config)?;
        let documents: Vec<Document> = documents
            .into_iter()
            .filter(|document| document.visible_to_customer)
            .collect();
        Ok(Outcome::success(ContractDetailsPayload {
            contract,
            documents,
            estimated_time_to_finish_analysis: estimate,
        }))
    }
}
