// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Strongly-typed entity identifiers.
//!
//! All identifiers are database-assigned integers. The newtypes exist so a
//! `ContractId` can never be passed where a `CustomerId` is expected.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifies a customer (lead or registered user).
    CustomerId
);
entity_id!(
    /// Identifies a back-office admin.
    AdminId
);
entity_id!(
    /// Identifies a contract (also used for offered products).
    ContractId
);
entity_id!(
    /// Identifies a document attached to a contract.
    DocumentId
);
entity_id!(
    /// Identifies an inquiry sent to an insurer.
    InquiryId
);
entity_id!(
    /// Identifies one category line of an inquiry.
    InquiryCategoryId
);
entity_id!(
    /// Identifies an offer.
    OfferId
);
entity_id!(
    /// Identifies one option (offered product) of an offer.
    OfferOptionId
);
entity_id!(
    /// Identifies a sales opportunity.
    OpportunityId
);
entity_id!(
    /// Identifies an interaction record.
    InteractionId
);
entity_id!(
    /// Identifies a notification attempt.
    NotificationId
);
entity_id!(
    /// Identifies a payback ledger transaction.
    PaybackTransactionId
);
entity_id!(
    /// Identifies an insurer subcompany.
    SubcompanyId
);

/// The kinds of entities driven by a lifecycle state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A contract's top-level state.
    Contract,
    /// A contract's document-review sub-lifecycle.
    ContractAnalysis,
    /// An inquiry.
    Inquiry,
    /// A single inquiry category.
    InquiryCategory,
    /// An offer.
    Offer,
    /// A sales opportunity.
    Opportunity,
}

impl EntityKind {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::ContractAnalysis => "contract_analysis",
            Self::Inquiry => "inquiry",
            Self::InquiryCategory => "inquiry_category",
            Self::Offer => "offer",
            Self::Opportunity => "opportunity",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract" => Ok(Self::Contract),
            "contract_analysis" => Ok(Self::ContractAnalysis),
            "inquiry" => Ok(Self::Inquiry),
            "inquiry_category" => Ok(Self::InquiryCategory),
            "offer" => Ok(Self::Offer),
            "opportunity" => Ok(Self::Opportunity),
            _ => Err(crate::DomainError::UnknownEntityKind(s.to_string())),
        }
    }
}

/// A reference to any lifecycle entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity kind.
    pub kind: EntityKind,
    /// The raw entity identifier.
    pub id: i64,
}

impl EntityRef {
    /// Creates a new entity reference.
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// References a contract.
    #[must_use]
    pub const fn contract(id: ContractId) -> Self {
        Self::new(EntityKind::Contract, id.value())
    }

    /// References an inquiry.
    #[must_use]
    pub const fn inquiry(id: InquiryId) -> Self {
        Self::new(EntityKind::Inquiry, id.value())
    }

    /// References one category of an inquiry.
    #[must_use]
    pub const fn inquiry_category(id: InquiryCategoryId) -> Self {
        Self::new(EntityKind::InquiryCategory, id.value())
    }

    /// References an offer.
    #[must_use]
    pub const fn offer(id: OfferId) -> Self {
        Self::new(EntityKind::Offer, id.value())
    }

    /// References an opportunity.
    #[must_use]
    pub const fn opportunity(id: OpportunityId) -> Self {
        Self::new(EntityKind::Opportunity, id.value())
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}
