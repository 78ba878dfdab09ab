// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The collaborators and configuration shared by every handler.

use std::sync::Arc;

use clark::{
    ContractRepository, CustomerNotifier, ErrorReporter, InquiryRepository,
    InteractionRepository, JobLogRepository, NotificationLog, OfferRepository,
    OpportunityRepository, PaybackConfig, PaybackLedger,
};
use clark_domain::AnalysisEstimateConfig;

use crate::jobs::{JobConfig, JobQueue};

/// Engine configuration, built once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClarkConfig {
    /// Parameters of the analysis completion estimate.
    pub analysis: AnalysisEstimateConfig,
    /// Payback ledger behaviour.
    pub payback: PaybackConfig,
    /// Background job behaviour.
    pub jobs: JobConfig,
}

/// Every collaborator an interactor may need, behind its trait.
pub struct Services {
    pub contracts: Arc<dyn ContractRepository>,
    pub inquiries: Arc<dyn InquiryRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub opportunities: Arc<dyn OpportunityRepository>,
    pub interactions: Arc<dyn InteractionRepository>,
    pub notifications: Arc<dyn NotificationLog>,
    pub payback: Arc<dyn PaybackLedger>,
    pub job_log: Arc<dyn JobLogRepository>,
    pub notifier: Arc<dyn CustomerNotifier>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub jobs: Arc<JobQueue>,
    pub config: ClarkConfig,
}

impl Services {
    /// Wires every repository seam to one store.
    ///
    /// # Arguments
    ///
    /// * `store` - A backend implementing every repository trait
    /// * `notifier` - The customer notifier
    /// * `reporter` - Receives handled infrastructure failures
    /// * `config` - Engine configuration
    #[must_use]
    pub fn from_store<S>(
        store: &Arc<S>,
        notifier: Arc<dyn CustomerNotifier>,
        reporter: Arc<dyn ErrorReporter>,
        config: ClarkConfig,
    ) -> Self
    where
        S: ContractRepository
            + InquiryRepository
            + OfferRepository
            + OpportunityRepository
            + InteractionRepository
            + NotificationLog
            + PaybackLedger
            + JobLogRepository
            + 'static,
    {
        Self {
            contracts: Arc::clone(store) as Arc<dyn ContractRepository>,
            inquiries: Arc::clone(store) as Arc<dyn InquiryRepository>,
            offers: Arc::clone(store) as Arc<dyn OfferRepository>,
            opportunities: Arc::clone(store) as Arc<dyn OpportunityRepository>,
            interactions: Arc::clone(store) as Arc<dyn InteractionRepository>,
            notifications: Arc::clone(store) as Arc<dyn NotificationLog>,
            payback: Arc::clone(store) as Arc<dyn PaybackLedger>,
            job_log: Arc::clone(store) as Arc<dyn JobLogRepository>,
            notifier,
            reporter,
            jobs: Arc::new(JobQueue::new()),
            config,
        }
    }
}
