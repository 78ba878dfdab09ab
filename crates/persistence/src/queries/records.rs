// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queries over append-only records: interactions, notification attempts and
//! job failures.

use clark::AsyncJobLog;
use clark_domain::{
    AdminId, ContractId, CustomerId, EntityKind, EntityRef, Interaction, InteractionId,
    Notification, NotificationId,
};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::{decode_map, parse_column, parse_timestamp};
use crate::diesel_schema::{async_job_logs, interactions, notifications};
use crate::error::PersistenceError;

/// Diesel Queryable struct for interaction rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = interactions)]
struct InteractionRow {
    interaction_id: i64,
    admin_id: i64,
    contract_id: i64,
    customer_id: i64,
    kind: String,
    content: String,
    metadata_json: String,
    created_at: String,
}

impl InteractionRow {
    fn into_interaction(self) -> Result<Interaction, PersistenceError> {
        Ok(Interaction {
            id: InteractionId::new(self.interaction_id),
            admin_id: AdminId::new(self.admin_id),
            contract_id: ContractId::new(self.contract_id),
            customer_id: CustomerId::new(self.customer_id),
            kind: parse_column("interactions", &self.kind)?,
            content: self.content,
            metadata: decode_map("interactions", &self.metadata_json)?,
            created_at: parse_timestamp("interactions", &self.created_at)?,
        })
    }
}

/// Diesel Queryable struct for notification rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = notifications)]
struct NotificationRow {
    notification_id: i64,
    entity_kind: String,
    entity_id: i64,
    customer_id: i64,
    channel: String,
    template: String,
    payload_json: String,
    status: String,
    error: Option<String>,
    created_at: String,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification, PersistenceError> {
        let kind: EntityKind = parse_column("notifications", &self.entity_kind)?;
        Ok(Notification {
            id: NotificationId::new(self.notification_id),
            entity: EntityRef::new(kind, self.entity_id),
            customer_id: CustomerId::new(self.customer_id),
            channel: parse_column("notifications", &self.channel)?,
            template: self.template,
            payload: decode_map("notifications", &self.payload_json)?,
            status: parse_column("notifications", &self.status)?,
            error: self.error,
            created_at: parse_timestamp("notifications", &self.created_at)?,
        })
    }
}

/// Diesel Queryable struct for job failure rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = async_job_logs)]
struct JobLogRow {
    log_id: i64,
    job_name: String,
    arguments: String,
    attempt: i32,
    error: String,
    created_at: String,
}

impl JobLogRow {
    fn into_log(self) -> Result<AsyncJobLog, PersistenceError> {
        Ok(AsyncJobLog {
            id: self.log_id,
            job_name: self.job_name,
            arguments: self.arguments,
            attempt: u32::try_from(self.attempt).map_err(|_| PersistenceError::CorruptRow {
                table: "async_job_logs",
                reason: format!("negative attempt {}", self.attempt),
            })?,
            error: self.error,
            created_at: parse_timestamp("async_job_logs", &self.created_at)?,
        })
    }
}

/// Loads one interaction.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_interaction(
    conn: &mut SqliteConnection,
    interaction_id: InteractionId,
) -> Result<Option<Interaction>, PersistenceError> {
    interactions::table
        .filter(interactions::interaction_id.eq(interaction_id.value()))
        .select(InteractionRow::as_select())
        .first::<InteractionRow>(conn)
        .optional()?
        .map(InteractionRow::into_interaction)
        .transpose()
}

/// Lists a contract's interactions, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn interactions_for(
    conn: &mut SqliteConnection,
    contract_id: ContractId,
) -> Result<Vec<Interaction>, PersistenceError> {
    interactions::table
        .filter(interactions::contract_id.eq(contract_id.value()))
        .order(interactions::interaction_id.asc())
        .select(InteractionRow::as_select())
        .load::<InteractionRow>(conn)?
        .into_iter()
        .map(InteractionRow::into_interaction)
        .collect()
}

/// Loads one notification attempt.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_notification(
    conn: &mut SqliteConnection,
    notification_id: NotificationId,
) -> Result<Option<Notification>, PersistenceError> {
    notifications::table
        .filter(notifications::notification_id.eq(notification_id.value()))
        .select(NotificationRow::as_select())
        .first::<NotificationRow>(conn)
        .optional()?
        .map(NotificationRow::into_notification)
        .transpose()
}

/// Lists the notification attempts concerning one entity, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn notifications_for(
    conn: &mut SqliteConnection,
    entity: EntityRef,
) -> Result<Vec<Notification>, PersistenceError> {
    notifications::table
        .filter(notifications::entity_kind.eq(entity.kind.as_str()))
        .filter(notifications::entity_id.eq(entity.id))
        .order(notifications::notification_id.asc())
        .select(NotificationRow::as_select())
        .load::<NotificationRow>(conn)?
        .into_iter()
        .map(NotificationRow::into_notification)
        .collect()
}

/// Loads one job failure.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn find_job_failure(
    conn: &mut SqliteConnection,
    log_id: i64,
) -> Result<Option<AsyncJobLog>, PersistenceError> {
    async_job_logs::table
        .filter(async_job_logs::log_id.eq(log_id))
        .select(JobLogRow::as_select())
        .first::<JobLogRow>(conn)
        .optional()?
        .map(JobLogRow::into_log)
        .transpose()
}

/// Lists every recorded job failure, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn job_failures(conn: &mut SqliteConnection) -> Result<Vec<AsyncJobLog>, PersistenceError> {
    async_job_logs::table
        .order(async_job_logs::log_id.asc())
        .select(JobLogRow::as_select())
        .load::<JobLogRow>(conn)?
        .into_iter()
        .map(JobLogRow::into_log)
        .collect()
}
