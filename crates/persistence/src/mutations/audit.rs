// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.
//!
//! Audit events are written by the same transaction as the state change they
//! describe. Nothing in this crate updates or deletes an audit row.

use clark_audit::AuditEvent;
use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Appends an audit event.
///
/// # Returns
///
/// The id of the new audit row.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&event.actor)?;
    let cause_json: String = serde_json::to_string(&event.cause)?;
    let action_json: String = serde_json::to_string(&event.action)?;
    let before_json: String = serde_json::to_string(&event.before)?;
    let after_json: String = serde_json::to_string(&event.after)?;

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::entity_kind.eq(event.entity.kind.as_str()),
            audit_events::entity_id.eq(event.entity.id),
            audit_events::actor_json.eq(&actor_json),
            audit_events::cause_json.eq(&cause_json),
            audit_events::action_json.eq(&action_json),
            audit_events::before_snapshot_json.eq(&before_json),
            audit_events::after_snapshot_json.eq(&after_json),
            audit_events::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    let event_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        event_id,
        entity = %event.entity,
        action = %event.action.name,
        "Audit event persisted"
    );
    Ok(event_id)
}
