// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{CUSTOMER, CountingReporter, RecordingChannel};
use crate::memory::InMemoryStore;
use crate::notify::{ErrorReporter, NotificationChannel, NotificationDispatcher};
use crate::repository::NotificationLog;
use clark_domain::{Channel, ContractId, EntityRef, Message, NotificationStatus};
use std::collections::BTreeMap;
use std::sync::Arc;

fn message() -> Message {
    Message {
        entity: EntityRef::contract(ContractId::new(5)),
        customer_id: CUSTOMER,
        template: String::from("contract_analysis_state_changed"),
        payload: BTreeMap::from([(String::from("contract_id"), String::from("5"))]),
    }
}

fn dispatcher(
    channels: Vec<Arc<dyn NotificationChannel>>,
) -> (NotificationDispatcher, Arc<InMemoryStore>, Arc<CountingReporter>) {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let reporter: Arc<CountingReporter> = Arc::new(CountingReporter::default());
    let dispatcher = NotificationDispatcher::new(
        channels,
        Arc::clone(&store) as Arc<dyn NotificationLog>,
        Arc::clone(&reporter) as Arc<dyn ErrorReporter>,
    );
    (dispatcher, store, reporter)
}

#[test]
fn test_dispatch_records_delivered_attempt() {
    let messenger = Arc::new(RecordingChannel::new(Channel::Messenger));
    let (dispatcher, store, reporter) =
        dispatcher(vec![Arc::clone(&messenger) as Arc<dyn NotificationChannel>]);

    let recorded = dispatcher.dispatch(&message(), Channel::Messenger).unwrap();

    assert_eq!(recorded.status, NotificationStatus::Delivered);
    assert_eq!(recorded.error, None);
    assert_eq!(messenger.delivered().len(), 1);
    assert_eq!(
        store
            .notifications_for(EntityRef::contract(ContractId::new(5)))
            .unwrap()
            .len(),
        1
    );
    assert!(reporter.captured().is_empty());
}

#[test]
fn test_channel_failure_is_isolated() {
    let email = Arc::new(RecordingChannel::failing(Channel::Email));
    let messenger = Arc::new(RecordingChannel::new(Channel::Messenger));
    let (dispatcher, _store, reporter) = dispatcher(vec![
        Arc::clone(&email) as Arc<dyn NotificationChannel>,
        Arc::clone(&messenger) as Arc<dyn NotificationChannel>,
    ]);

    let attempts = dispatcher.fan_out(&message(), &[Channel::Email, Channel::Messenger]);

    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].status, NotificationStatus::Failed);
    assert_eq!(attempts[0].error.as_deref(), Some("socket closed"));
    assert_eq!(attempts[1].status, NotificationStatus::Delivered);
    assert_eq!(messenger.delivered().len(), 1);
    assert_eq!(reporter.captured(), vec![String::from("notification delivery")]);
}

#[test]
fn test_missing_transport_is_recorded_as_failure() {
    let (dispatcher, _store, _reporter) = dispatcher(Vec::new());

    let recorded = dispatcher.dispatch(&message(), Channel::Email).unwrap();

    assert_eq!(recorded.status, NotificationStatus::Failed);
    assert_eq!(recorded.error.as_deref(), Some("no transport registered"));
}
