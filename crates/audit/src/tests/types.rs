// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clark_domain::{
    AdminId, AnalysisEvent, AnalysisState, ContractId, CustomerId, EntityKind, EntityRef,
};

fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Customer request"))
}

#[test]
fn test_actor_constructors_set_type() {
    let customer: Actor = Actor::customer(CustomerId::new(42));
    let admin: Actor = Actor::admin(AdminId::new(7));
    let system: Actor = Actor::system("payback_recalculation");

    assert_eq!(customer.id, "42");
    assert_eq!(customer.actor_type, "customer");
    assert_eq!(admin.actor_type, "admin");
    assert_eq!(system.id, "payback_recalculation");
    assert_eq!(system.actor_type, "system");
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        String::from("fail_analysis"),
        Some(String::from("blurry_scan")),
    );

    assert_eq!(action.name, "fail_analysis");
    assert_eq!(action.details, Some(String::from("blurry_scan")));
}

#[test]
fn test_snapshot_of_nil_state() {
    let snapshot: StateSnapshot = StateSnapshot::of::<AnalysisState>(None);
    assert_eq!(snapshot.state, None);
}

#[test]
fn test_transition_event_records_before_and_after() {
    let event: AuditEvent = AuditEvent::transition(
        Actor::customer(CustomerId::new(42)),
        create_test_cause(),
        EntityRef::contract(ContractId::new(9)),
        AnalysisEvent::RequestAnalysis,
        Some(AnalysisState::DetailsMissing),
        AnalysisState::UnderAnalysis,
    );

    assert_eq!(event.action.name, "request_analysis");
    assert_eq!(event.entity.kind, EntityKind::Contract);
    assert_eq!(event.entity.id, 9);
    assert_eq!(event.before.state.as_deref(), Some("details_missing"));
    assert_eq!(event.after.state.as_deref(), Some("under_analysis"));
}

#[test]
fn test_audit_event_serializes_for_storage() {
    let event: AuditEvent = AuditEvent::new(
        Actor::admin(AdminId::new(1)),
        create_test_cause(),
        Action::new(String::from("complete"), None),
        EntityRef::new(EntityKind::Opportunity, 3),
        StateSnapshot::new(Some(String::from("offer_phase"))),
        StateSnapshot::new(Some(String::from("completed"))),
    );

    let json: String = serde_json::to_string(&event).unwrap();
    let parsed: AuditEvent = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, event);
    assert!(json.contains("\"kind\":\"opportunity\""));
}

#[test]
fn test_actor_equality() {
    let actor1: Actor = Actor::admin(AdminId::new(5));
    let actor2: Actor = Actor::new(String::from("5"), String::from("admin"));
    let actor3: Actor = Actor::customer(CustomerId::new(5));

    assert_eq!(actor1, actor2);
    assert_ne!(actor1, actor3);
}
