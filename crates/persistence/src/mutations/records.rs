// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inserts for append-only records.

use clark::{AsyncJobLog, NewAsyncJobLog};
use clark_domain::{
    Interaction, InteractionId, Message, NewInteraction, NewNotification, Notification,
    NotificationId,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{encode_map, format_timestamp};
use crate::diesel_schema::{async_job_logs, interactions, notifications};
use crate::error::PersistenceError;
use crate::queries::contracts::require_contract;
use crate::queries::records::{find_interaction, find_job_failure, find_notification};

/// Records an interaction after validating it.
///
/// # Errors
///
/// Returns `Validation` for an incomplete record, `NotFound` if the contract
/// does not exist, or an error if the insert fails.
pub fn insert_interaction(
    conn: &mut SqliteConnection,
    interaction: &NewInteraction,
    now: OffsetDateTime,
) -> Result<Interaction, PersistenceError> {
    interaction
        .validate()
        .map_err(|err| PersistenceError::Validation {
            field: String::from("interaction"),
            message: err.to_string(),
        })?;
    require_contract(conn, interaction.contract_id)?;

    diesel::insert_into(interactions::table)
        .values((
            interactions::admin_id.eq(interaction.admin_id.value()),
            interactions::contract_id.eq(interaction.contract_id.value()),
            interactions::customer_id.eq(interaction.customer_id.value()),
            interactions::kind.eq(interaction.kind.as_str()),
            interactions::content.eq(&interaction.content),
            interactions::metadata_json.eq(encode_map(&interaction.metadata)?),
            interactions::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let interaction_id: InteractionId = InteractionId::new(get_last_insert_rowid(conn)?);
    debug!(interaction_id = %interaction_id, kind = %interaction.kind, "Interaction recorded");
    find_interaction(conn, interaction_id)?.ok_or(PersistenceError::NotFound {
        resource: "interaction",
        id: interaction_id.value(),
    })
}

/// Records one notification attempt.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_notification(
    conn: &mut SqliteConnection,
    notification: &NewNotification,
    now: OffsetDateTime,
) -> Result<Notification, PersistenceError> {
    let message: &Message = &notification.message;
    diesel::insert_into(notifications::table)
        .values((
            notifications::entity_kind.eq(message.entity.kind.as_str()),
            notifications::entity_id.eq(message.entity.id),
            notifications::customer_id.eq(message.customer_id.value()),
            notifications::channel.eq(notification.channel.as_str()),
            notifications::template.eq(&message.template),
            notifications::payload_json.eq(encode_map(&message.payload)?),
            notifications::status.eq(notification.status.as_str()),
            notifications::error.eq(notification.error.as_deref()),
            notifications::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let notification_id: NotificationId = NotificationId::new(get_last_insert_rowid(conn)?);
    debug!(
        notification_id = %notification_id,
        entity = %message.entity,
        channel = %notification.channel,
        status = %notification.status,
        "Notification attempt recorded"
    );
    find_notification(conn, notification_id)?.ok_or(PersistenceError::NotFound {
        resource: "notification",
        id: notification_id.value(),
    })
}

/// Records a failed job attempt.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_job_failure(
    conn: &mut SqliteConnection,
    log: &NewAsyncJobLog,
    now: OffsetDateTime,
) -> Result<AsyncJobLog, PersistenceError> {
    diesel::insert_into(async_job_logs::table)
        .values((
            async_job_logs::job_name.eq(&log.job_name),
            async_job_logs::arguments.eq(&log.arguments),
            async_job_logs::attempt.eq(i32::try_from(log.attempt).unwrap_or(i32::MAX)),
            async_job_logs::error.eq(&log.error),
            async_job_logs::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let log_id: i64 = get_last_insert_rowid(conn)?;
    warn!(
        log_id,
        job_name = %log.job_name,
        attempt = log.attempt,
        "Job failure recorded"
    );
    find_job_failure(conn, log_id)?.ok_or(PersistenceError::NotFound {
        resource: "async_job_log",
        id: log_id,
    })
}
