// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::ids::{AdminId, ContractId, CustomerId, InteractionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::OffsetDateTime;

/// Metadata key holding the comma-joined correction reasons.
pub const REASONS_METADATA_KEY: &str = "reasons";

/// Kinds of recorded admin/customer interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// An admin asked the customer to correct their documents.
    RequestCorrection,
    /// An email was sent to the customer.
    SentEmail,
    /// A free-form message.
    Message,
}

impl InteractionKind {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RequestCorrection => "request_correction",
            Self::SentEmail => "sent_email",
            Self::Message => "message",
        }
    }
}

impl FromStr for InteractionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request_correction" => Ok(Self::RequestCorrection),
            "sent_email" => Ok(Self::SentEmail),
            "message" => Ok(Self::Message),
            _ => Err(DomainError::UnknownInteractionKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub admin_id: AdminId,
    pub contract_id: ContractId,
    pub customer_id: CustomerId,
    pub kind: InteractionKind,
    pub content: String,
    pub metadata: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// An interaction to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInteraction {
    pub admin_id: AdminId,
    pub contract_id: ContractId,
    pub customer_id: CustomerId,
    pub kind: InteractionKind,
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl NewInteraction {
    /// Builds the correction-request interaction for a contract.
    ///
    /// Blank reasons are dropped; the remaining reasons are stored comma-joined
    /// under [`REASONS_METADATA_KEY`]. The content is the trimmed free text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInteraction` if neither a reason nor any
    /// free text remains.
    pub fn correction_request(
        admin_id: AdminId,
        contract_id: ContractId,
        customer_id: CustomerId,
        reasons: &[String],
        free_text: &str,
    ) -> Result<Self, DomainError> {
        let reasons: Vec<&str> = reasons
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        let content: &str = free_text.trim();

        if reasons.is_empty() && content.is_empty() {
            return Err(DomainError::InvalidInteraction {
                field: "content",
                reason: "a correction request needs at least one reason or a message".to_string(),
            });
        }

        let mut metadata: BTreeMap<String, String> = BTreeMap::new();
        if !reasons.is_empty() {
            metadata.insert(REASONS_METADATA_KEY.to_string(), reasons.join(","));
        }

        let interaction = Self {
            admin_id,
            contract_id,
            customer_id,
            kind: InteractionKind::RequestCorrection,
            content: content.to_string(),
            metadata,
        };
        interaction.validate()?;
        Ok(interaction)
    }

    /// Builds the record of an email sent to the customer.
    #[must_use]
    pub fn sent_email(
        admin_id: AdminId,
        contract_id: ContractId,
        customer_id: CustomerId,
        template: &str,
    ) -> Self {
        let mut metadata: BTreeMap<String, String> = BTreeMap::new();
        metadata.insert("template".to_string(), template.to_string());
        Self {
            admin_id,
            contract_id,
            customer_id,
            kind: InteractionKind::SentEmail,
            content: template.to_string(),
            metadata,
        }
    }

    /// Checks structural completeness.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInteraction` naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.content.trim().is_empty() && self.metadata.is_empty() {
            return Err(DomainError::InvalidInteraction {
                field: "content",
                reason: "content and metadata cannot both be empty".to_string(),
            });
        }
        if self.metadata.keys().any(|k| k.trim().is_empty()) {
            return Err(DomainError::InvalidInteraction {
                field: "metadata",
                reason: "metadata keys cannot be blank".to_string(),
            });
        }
        Ok(())
    }
}
