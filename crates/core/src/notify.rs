// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer notifications.
//!
//! The [`NotificationDispatcher`] delivers a [`Message`] over one or more
//! channels and records every attempt in the [`NotificationLog`]. It never
//! fails from the caller's point of view: delivery and logging errors are
//! logged and handed to the [`ErrorReporter`]. A failure on one channel does
//! not affect the others.

use crate::repository::NotificationLog;
use clark_domain::{
    Channel, Contract, CustomerId, EntityRef, Inquiry, Message, NewNotification, Notification,
    NotificationStatus, Offer, OfferOptionId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Template names used for customer notifications.
pub mod templates {
    pub const REQUEST_CORRECTION: &str = "contract_analysis_request_correction";
    pub const ANALYSIS_STATE_CHANGED: &str = "contract_analysis_state_changed";
    pub const OFFER_ACCEPTED: &str = "offer_accepted";
    pub const INQUIRY_CATEGORIES_CANCELLED: &str = "inquiry_categories_cancelled";
}

/// A channel rejected a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{channel} delivery failed: {reason}")]
pub struct DeliveryError {
    /// The channel that failed.
    pub channel: Channel,
    /// Why delivery failed.
    pub reason: String,
}

/// A transport for one [`Channel`].
pub trait NotificationChannel: Send + Sync {
    /// The channel this transport serves.
    fn channel(&self) -> Channel;

    /// Delivers a message.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the message could not be handed off.
    fn deliver(&self, message: &Message) -> Result<(), DeliveryError>;
}

/// Receives infrastructure failures for external tracking.
pub trait ErrorReporter: Send + Sync {
    /// Reports a failure that was handled but should be tracked.
    fn capture(&self, context: &str, error: &dyn std::error::Error);
}

/// Reports errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn capture(&self, context: &str, err: &dyn std::error::Error) {
        error!(context, error = %err, "captured error");
    }
}

/// Email transport that writes outgoing mail to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl NotificationChannel for LogMailer {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        info!(
            customer_id = %message.customer_id,
            entity = %message.entity,
            template = %message.template,
            "email queued"
        );
        Ok(())
    }
}

/// Delivers messages and records every attempt.
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
    log: Arc<dyn NotificationLog>,
    reporter: Arc<dyn ErrorReporter>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over the given transports.
    #[must_use]
    pub fn new(
        channels: Vec<Arc<dyn NotificationChannel>>,
        log: Arc<dyn NotificationLog>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            channels,
            log,
            reporter,
        }
    }

    /// Delivers `message` over `channel` and records the attempt.
    ///
    /// # Returns
    ///
    /// The recorded attempt, or `None` if the attempt itself could not be
    /// recorded.
    pub fn dispatch(&self, message: &Message, channel: Channel) -> Option<Notification> {
        let result: Result<(), DeliveryError> = self
            .channels
            .iter()
            .find(|transport| transport.channel() == channel)
            .map_or_else(
                || {
                    Err(DeliveryError {
                        channel,
                        reason: String::from("no transport registered"),
                    })
                },
                |transport| transport.deliver(message),
            );

        let (status, error_text): (NotificationStatus, Option<String>) = match result {
            Ok(()) => (NotificationStatus::Delivered, None),
            Err(err) => {
                warn!(
                    entity = %message.entity,
                    channel = %channel,
                    error = %err,
                    "notification delivery failed"
                );
                self.reporter.capture("notification delivery", &err);
                (NotificationStatus::Failed, Some(err.reason))
            }
        };

        match self.log.record_notification(NewNotification {
            message: message.clone(),
            channel,
            status,
            error: error_text,
        }) {
            Ok(notification) => Some(notification),
            Err(err) => {
                warn!(entity = %message.entity, error = %err, "failed to record notification");
                self.reporter.capture("notification log", &err);
                None
            }
        }
    }

    /// Delivers `message` over each channel independently.
    pub fn fan_out(&self, message: &Message, channels: &[Channel]) -> Vec<Notification> {
        channels
            .iter()
            .filter_map(|channel| self.dispatch(message, *channel))
            .collect()
    }
}

/// No channel accepted a customer notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification '{template}' for {entity} was not delivered on any channel")]
pub struct NotifyError {
    /// The notification template.
    pub template: String,
    /// The entity the notification concerned.
    pub entity: EntityRef,
}

/// Business-level customer notifications fired after transitions.
pub trait CustomerNotifier: Send + Sync {
    /// Tells the customer their documents need correcting.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if no channel delivered the notification.
    fn request_correction(
        &self,
        contract: &Contract,
        reasons: &[String],
        free_text: &str,
    ) -> Result<(), NotifyError>;

    /// Tells the customer the contract's analysis state changed.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if no channel delivered the notification.
    fn analysis_state_changed(&self, contract: &Contract) -> Result<(), NotifyError>;

    /// Confirms an accepted offer.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if no channel delivered the notification.
    fn offer_accepted(&self, offer: &Offer, option_id: OfferOptionId) -> Result<(), NotifyError>;

    /// Tells the customer the insurer declined every category of an inquiry.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if no channel delivered the notification.
    fn inquiry_categories_cancelled(&self, inquiry: &Inquiry) -> Result<(), NotifyError>;
}

/// [`CustomerNotifier`] that fans out through a [`NotificationDispatcher`].
pub struct DispatchingNotifier {
    dispatcher: Arc<NotificationDispatcher>,
    channels: Vec<Channel>,
}

impl DispatchingNotifier {
    /// Sends every notification on each of `channels`.
    #[must_use]
    pub const fn new(dispatcher: Arc<NotificationDispatcher>, channels: Vec<Channel>) -> Self {
        Self {
            dispatcher,
            channels,
        }
    }

    fn send(
        &self,
        entity: EntityRef,
        customer_id: CustomerId,
        template: &str,
        payload: BTreeMap<String, String>,
    ) -> Result<(), NotifyError> {
        let message: Message = Message {
            entity,
            customer_id,
            template: template.to_string(),
            payload,
        };
        let attempts: Vec<Notification> = self.dispatcher.fan_out(&message, &self.channels);
        if attempts.iter().any(Notification::is_delivered) {
            Ok(())
        } else {
            Err(NotifyError {
                template: template.to_string(),
                entity,
            })
        }
    }
}

impl CustomerNotifier for DispatchingNotifier {
    fn request_correction(
        &self,
        contract: &Contract,
        reasons: &[String],
        free_text: &str,
    ) -> Result<(), NotifyError> {
        let payload: BTreeMap<String, String> = BTreeMap::from([
            (String::from("contract_id"), contract.id.to_string()),
            (String::from("category_ident"), contract.category_ident.clone()),
            (String::from("reasons"), reasons.join(",")),
            (String::from("free_text"), free_text.to_string()),
        ]);
        self.send(
            EntityRef::contract(contract.id),
            contract.customer_id,
            templates::REQUEST_CORRECTION,
            payload,
        )
    }

    fn analysis_state_changed(&self, contract: &Contract) -> Result<(), NotifyError> {
        let state: String = contract
            .analysis_state
            .map_or_else(String::new, |s| s.to_string());
        let payload: BTreeMap<String, String> = BTreeMap::from([
            (String::from("contract_id"), contract.id.to_string()),
            (String::from("analysis_state"), state),
        ]);
        self.send(
            EntityRef::contract(contract.id),
            contract.customer_id,
            templates::ANALYSIS_STATE_CHANGED,
            payload,
        )
    }

    fn offer_accepted(&self, offer: &Offer, option_id: OfferOptionId) -> Result<(), NotifyError> {
        let mut payload: BTreeMap<String, String> = BTreeMap::from([
            (String::from("offer_id"), offer.id.to_string()),
            (String::from("option_id"), option_id.to_string()),
        ]);
        if let Some(option) = offer.option(option_id) {
            payload.insert(String::from("contract_id"), option.contract_id.to_string());
        }
        self.send(
            EntityRef::offer(offer.id),
            offer.customer_id,
            templates::OFFER_ACCEPTED,
            payload,
        )
    }

    fn inquiry_categories_cancelled(&self, inquiry: &Inquiry) -> Result<(), NotifyError> {
        let causes: Vec<String> = inquiry
            .categories
            .iter()
            .filter_map(|c| c.cancellation_cause.clone())
            .collect();
        let idents: Vec<String> = inquiry
            .categories
            .iter()
            .map(|c| c.category_ident.clone())
            .collect();
        let payload: BTreeMap<String, String> = BTreeMap::from([
            (String::from("inquiry_id"), inquiry.id.to_string()),
            (String::from("subcompany_id"), inquiry.subcompany_id.to_string()),
            (String::from("category_idents"), idents.join(",")),
            (String::from("cancellation_causes"), causes.join(",")),
        ]);
        self.send(
            EntityRef::inquiry(inquiry.id),
            inquiry.customer_id,
            templates::INQUIRY_CATEGORIES_CANCELLED,
            payload,
        )
    }
}
