// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract documents and the analysis completion estimate.
//!
//! ## Estimate rule
//!
//! - Only documents visible to the customer are considered
//! - The most recent such document (by `created_at`) decides
//! - If it is not of the configured trigger type, there is no estimate
//! - Its timestamp is read in the configured timezone
//! - Saturday and Sunday uploads get the weekend offset, all others the weekday offset

use crate::error::DomainError;
use crate::ids::{ContractId, DocumentId};
use chrono::{Datelike, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Uploaded by the customer for analysis.
    CustomerUpload,
    Policy,
    OfferDocument,
    Cancellation,
    Invoice,
    Other,
}

impl DocumentType {
    /// Returns the persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerUpload => "customer_upload",
            Self::Policy => "policy",
            Self::OfferDocument => "offer_document",
            Self::Cancellation => "cancellation",
            Self::Invoice => "invoice",
            Self::Other => "other",
        }
    }
}

impl FromStr for DocumentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer_upload" => Ok(Self::CustomerUpload),
            "policy" => Ok(Self::Policy),
            "offer_document" => Ok(Self::OfferDocument),
            "cancellation" => Ok(Self::Cancellation),
            "invoice" => Ok(Self::Invoice),
            "other" => Ok(Self::Other),
            _ => Err(DomainError::UnknownDocumentType(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub contract_id: ContractId,
    pub document_type: DocumentType,
    pub file_name: String,
    /// Content checksum; uploads with a known checksum are not stored twice.
    pub checksum: String,
    pub visible_to_customer: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A document about to be attached to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub document_type: DocumentType,
    pub file_name: String,
    pub checksum: String,
    #[serde(default = "default_visible")]
    pub visible_to_customer: bool,
}

const fn default_visible() -> bool {
    true
}

/// Parameters of the analysis completion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisEstimateConfig {
    /// Timezone used to decide the upload weekday.
    pub timezone: Tz,
    /// Document type whose upload starts the clock.
    pub trigger_type: DocumentType,
    /// Offset applied to uploads on Monday through Friday.
    pub weekday_offset: Duration,
    /// Offset applied to uploads on Saturday and Sunday.
    pub weekend_offset: Duration,
}

impl Default for AnalysisEstimateConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Berlin,
            trigger_type: DocumentType::CustomerUpload,
            weekday_offset: Duration::hours(24),
            weekend_offset: Duration::hours(76),
        }
    }
}

impl AnalysisEstimateConfig {
    /// Builds a configuration from an IANA timezone name and hour offsets.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the name cannot be resolved.
    pub fn from_parts(
        timezone: &str,
        trigger_type: DocumentType,
        weekday_hours: i64,
        weekend_hours: i64,
    ) -> Result<Self, DomainError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self {
            timezone: tz,
            trigger_type,
            weekday_offset: Duration::hours(weekday_hours),
            weekend_offset: Duration::hours(weekend_hours),
        })
    }
}

/// Estimates when the analysis of a contract's documents will finish.
///
/// # Arguments
///
/// * `documents` - All documents of the contract, in any order
/// * `config` - Estimate parameters
///
/// # Returns
///
/// `Ok(None)` when no visible document exists or the latest visible document
/// is not of the trigger type.
///
/// # Errors
///
/// Returns `DomainError::DateArithmeticOverflow` if the timestamp cannot be
/// represented after conversion or after adding the offset.
pub fn estimate_analysis_completion(
    documents: &[Document],
    config: &AnalysisEstimateConfig,
) -> Result<Option<OffsetDateTime>, DomainError> {
    let Some(latest) = documents
        .iter()
        .filter(|d| d.visible_to_customer)
        .max_by_key(|d| (d.created_at, d.id))
    else {
        return Ok(None);
    };

    if latest.document_type != config.trigger_type {
        return Ok(None);
    }

    let weekday: Weekday = local_weekday(latest.created_at, config.timezone)?;
    let offset: Duration = if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        config.weekend_offset
    } else {
        config.weekday_offset
    };

    latest
        .created_at
        .checked_add(offset)
        .map(Some)
        .ok_or_else(|| DomainError::DateArithmeticOverflow {
            operation: format!("adding {offset} to {}", latest.created_at),
        })
}

fn local_weekday(at: OffsetDateTime, tz: Tz) -> Result<Weekday, DomainError> {
    let utc = chrono::DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond()).ok_or_else(
        || DomainError::DateArithmeticOverflow {
            operation: format!("converting {at} to {tz}"),
        },
    )?;
    Ok(utc.with_timezone(&tz).weekday())
}
