// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use clark_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clark_domain::{EntityKind, EntityRef};
use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::parse_column;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    entity_kind: String,
    entity_id: i64,
    actor_json: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
}

impl AuditEventRow {
    fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let kind: EntityKind = parse_column("audit_events", &self.entity_kind)?;
        let actor: Actor = serde_json::from_str(&self.actor_json)?;
        let cause: Cause = serde_json::from_str(&self.cause_json)?;
        let action: Action = serde_json::from_str(&self.action_json)?;
        let before: StateSnapshot = serde_json::from_str(&self.before_snapshot_json)?;
        let after: StateSnapshot = serde_json::from_str(&self.after_snapshot_json)?;
        Ok(AuditEvent {
            actor,
            cause,
            action,
            entity: EntityRef::new(kind, self.entity_id),
            before,
            after,
        })
    }
}

/// Lists the audit events recorded for one entity, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be deserialized.
pub fn events_for(
    conn: &mut SqliteConnection,
    entity: EntityRef,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::entity_kind.eq(entity.kind.as_str()))
        .filter(audit_events::entity_id.eq(entity.id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(AuditEventRow::into_event)
        .collect()
}
