// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Subscriptions and the background publish loop that keeps them fed.
//!
//! A [`SubscriptionRegistry`] owns the map from server-assigned subscription
//! id to the channel a [`Subscription`] reads from, and lazily starts a
//! single [`PublishPump`]-style background task the first time a
//! subscription is created. The pump holds only a weak reference back to the
//! registry so the two don't keep each other alive forever.

use std::{collections::HashMap, sync::Weak, time::Duration};

use log::{debug, warn};
use opcua_core::{comms::message_chunk::MessageChunkType, sync::Mutex};
use opcua_types::{
    service_types::{
        CreateSubscriptionRequest, CreateSubscriptionResponse, DataChangeNotification,
        DeleteSubscriptionsRequest, DeleteSubscriptionsResponse, EventNotificationList,
        PublishRequest, PublishResponse, StatusChangeNotification, SubscriptionAcknowledgement,
    },
    Context, DecodingOptions, ExtensionObject, ObjectId, StatusCode,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc;

use crate::session_manager::Session;

/// Parameters requested when creating a subscription; the server may revise
/// any of the interval/count fields.
#[derive(Debug, Clone)]
pub struct SubscriptionParams {
    pub publishing_interval: Duration,
    pub lifetime_count: u32,
    pub max_keep_alive_count: u32,
    pub max_notifications_per_publish: u32,
    pub publishing_enabled: bool,
    pub priority: u8,
    /// Capacity of the notification queue delivered to the caller; `0`
    /// degrades to the smallest possible buffered channel, approximating a
    /// synchronous handoff since Tokio's mpsc does not offer true
    /// rendezvous channels.
    pub channel_buffer_size: usize,
}

impl Default for SubscriptionParams {
    fn default() -> Self {
        Self {
            publishing_interval: Duration::from_millis(500),
            lifetime_count: 600,
            max_keep_alive_count: 10,
            max_notifications_per_publish: 0,
            publishing_enabled: true,
            priority: 0,
            channel_buffer_size: 16,
        }
    }
}

/// One decoded `NotificationData` payload pushed by the server.
#[derive(Debug, Clone)]
pub enum NotificationValue {
    DataChange(DataChangeNotification),
    Event(EventNotificationList),
    StatusChange(StatusChangeNotification),
}

/// Something that went wrong delivering a notification: either a service
/// fault reported by the server, or a malformed publish response this client
/// couldn't make sense of.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    #[error("{0}")]
    Status(StatusCode),
    #[error("{0}")]
    Message(String),
}

/// One item delivered to a subscription's consumer: either a decoded
/// notification or an error tied to that subscription.
#[derive(Debug, Clone)]
pub struct PublishNotificationData {
    pub subscription_id: u32,
    pub value: Result<NotificationValue, PublishError>,
}

struct RegistryInner {
    subscriptions: Mutex<HashMap<u32, mpsc::Sender<PublishNotificationData>>>,
    pump_started: AtomicBool,
    last_publish: Mutex<std::time::Instant>,
}

/// Tracks live subscriptions on one session and drives the background
/// publish loop that keeps them fed.
pub struct SubscriptionRegistry {
    inner: RegistryInner,
    session: Arc<Session>,
}

impl SubscriptionRegistry {
    pub fn new(session: Arc<Session>) -> Arc<Self> {
        Arc::new(Self {
            inner: RegistryInner {
                subscriptions: Mutex::new(HashMap::new()),
                pump_started: AtomicBool::new(false),
                last_publish: Mutex::new(std::time::Instant::now()),
            },
            session,
        })
    }

    /// When the publish loop last saw any response (success or a
    /// keep-alive-only timeout) from the server. Used by a keep-alive
    /// watchdog to detect a silently dead connection.
    pub fn last_publish_at(&self) -> std::time::Instant {
        *self.inner.last_publish.lock()
    }

    /// Creates a subscription and, if this is the first one, starts the
    /// background publish loop.
    pub async fn subscribe(
        self: &Arc<Self>,
        params: SubscriptionParams,
    ) -> Result<Subscription, StatusCode> {
        let request = CreateSubscriptionRequest {
            request_header: self.session.request_header(10_000),
            requested_publishing_interval: params.publishing_interval.as_secs_f64() * 1000.0,
            requested_lifetime_count: params.lifetime_count,
            requested_max_keep_alive_count: params.max_keep_alive_count,
            max_notifications_per_publish: params.max_notifications_per_publish,
            publishing_enabled: params.publishing_enabled,
            priority: params.priority,
        };
        let response = self
            .session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::CreateSubscription(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: CreateSubscriptionResponse = *response;
        response.response_header.service_result.status_ok()?;

        let (tx, rx) = mpsc::channel(params.channel_buffer_size.max(1));
        self.inner
            .subscriptions
            .lock()
            .insert(response.subscription_id, tx);
        self.ensure_pump_running();

        Ok(Subscription {
            subscription_id: response.subscription_id,
            revised_publishing_interval: response.revised_publishing_interval,
            revised_lifetime_count: response.revised_lifetime_count,
            revised_max_keep_alive_count: response.revised_max_keep_alive_count,
            notifications: rx,
            registry: Arc::clone(self),
        })
    }

    fn ensure_pump_running(self: &Arc<Self>) {
        if self.inner.pump_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let weak = Arc::downgrade(self);
        tokio::spawn(run_publish_pump(weak));
    }

    async fn deliver(&self, subscription_id: u32, value: Result<NotificationValue, PublishError>) {
        let sender = self
            .inner
            .subscriptions
            .lock()
            .get(&subscription_id)
            .cloned();
        if let Some(sender) = sender {
            sender
                .send(PublishNotificationData {
                    subscription_id,
                    value,
                })
                .await
                .ok();
        }
    }

    async fn fanout_error(&self, err: StatusCode) {
        let senders: Vec<(u32, mpsc::Sender<PublishNotificationData>)> = self
            .inner
            .subscriptions
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();
        for (subscription_id, sender) in senders {
            sender
                .send(PublishNotificationData {
                    subscription_id,
                    value: Err(PublishError::Status(err)),
                })
                .await
                .ok();
        }
    }
}

/// A live subscription: a handle to its notification stream, plus enough
/// state to send `DeleteSubscriptionsRequest` on [`unsubscribe`](Self::unsubscribe).
pub struct Subscription {
    subscription_id: u32,
    revised_publishing_interval: f64,
    revised_lifetime_count: u32,
    revised_max_keep_alive_count: u32,
    notifications: mpsc::Receiver<PublishNotificationData>,
    registry: Arc<SubscriptionRegistry>,
}

impl Subscription {
    pub fn subscription_id(&self) -> u32 {
        self.subscription_id
    }

    pub fn revised_publishing_interval(&self) -> f64 {
        self.revised_publishing_interval
    }

    pub fn revised_lifetime_count(&self) -> u32 {
        self.revised_lifetime_count
    }

    pub fn revised_max_keep_alive_count(&self) -> u32 {
        self.revised_max_keep_alive_count
    }

    /// Waits for the next notification or error pushed by the publish loop.
    /// Returns `None` once the registry has dropped this subscription's
    /// sender (the session is gone).
    pub async fn recv(&mut self) -> Option<PublishNotificationData> {
        self.notifications.recv().await
    }

    /// Removes this subscription from the registry and sends
    /// `DeleteSubscriptionsRequest`. The registry entry is removed
    /// unconditionally first, so a failing delete still stops local
    /// delivery; the failure itself is still surfaced to the caller.
    pub async fn unsubscribe(self) -> Result<(), StatusCode> {
        self.registry
            .inner
            .subscriptions
            .lock()
            .remove(&self.subscription_id);

        let request = DeleteSubscriptionsRequest {
            request_header: self.registry.session.request_header(10_000),
            subscription_ids: Some(vec![self.subscription_id]),
        };
        let response = self
            .registry
            .session
            .channel()
            .send_request(request.into(), MessageChunkType::Message)
            .await?;
        let opcua_core::ResponseMessage::DeleteSubscriptions(response) = response else {
            return Err(StatusCode::BadUnexpectedError);
        };
        let response: DeleteSubscriptionsResponse = *response;
        response.response_header.service_result.status_ok()?;
        if let Some(bad) = response
            .results
            .as_ref()
            .and_then(|results| results.iter().find(|r| !r.is_good()))
        {
            return Err(*bad);
        }
        Ok(())
    }
}

/// Keeps one `PublishRequest` outstanding for as long as the registry has
/// subscriptions, acknowledging delivered sequence numbers on the next
/// round-trip and demultiplexing notification data to the matching
/// subscription's channel. Exits once the registry is empty or dropped.
async fn run_publish_pump(registry: Weak<SubscriptionRegistry>) {
    let mut acks: Vec<SubscriptionAcknowledgement> = Vec::new();
    loop {
        let Some(reg) = registry.upgrade() else {
            return;
        };
        if reg.inner.subscriptions.lock().is_empty() {
            reg.inner.pump_started.store(false, Ordering::SeqCst);
            debug!("publish pump stopping: no subscriptions remain");
            return;
        }
        let channel = Arc::clone(reg.session.channel());
        let request = PublishRequest {
            request_header: reg.session.request_header(120_000),
            subscription_acknowledgements: if acks.is_empty() {
                None
            } else {
                Some(std::mem::take(&mut acks))
            },
        };
        drop(reg);

        let result = channel
            .send_request(request.into(), MessageChunkType::Message)
            .await;

        let Some(reg) = registry.upgrade() else {
            return;
        };
        match result {
            Ok(opcua_core::ResponseMessage::Publish(response)) => {
                *reg.inner.last_publish.lock() = std::time::Instant::now();
                let response: PublishResponse = *response;
                acks = response
                    .available_sequence_numbers
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|sequence_number| SubscriptionAcknowledgement {
                        subscription_id: response.subscription_id,
                        sequence_number,
                    })
                    .collect();

                if response.response_header.service_result.is_good() {
                    handle_publish_response(&reg, response).await;
                } else {
                    reg.deliver(
                        response.subscription_id,
                        Err(PublishError::Status(response.response_header.service_result)),
                    )
                    .await;
                }
            }
            Ok(_) => {
                warn!("publish pump received a non-Publish response, ignoring");
            }
            Err(StatusCode::BadTimeout) => {
                *reg.inner.last_publish.lock() = std::time::Instant::now();
            }
            Err(StatusCode::BadNoSubscription) => {
                *reg.inner.last_publish.lock() = std::time::Instant::now();
            }
            Err(err) => reg.fanout_error(err).await,
        }
    }
}

async fn handle_publish_response(registry: &SubscriptionRegistry, response: PublishResponse) {
    let subscription_id = response.subscription_id;
    if let Some(bad) = response
        .results
        .as_ref()
        .and_then(|results| results.iter().find(|r| !r.is_good()))
    {
        registry
            .deliver(subscription_id, Err(PublishError::Status(*bad)))
            .await;
        return;
    }

    let entries = match response.notification_message.notification_data {
        Some(entries) if !entries.is_empty() => entries,
        _ => {
            registry
                .deliver(
                    subscription_id,
                    Err(PublishError::Message("empty NotificationMessage".into())),
                )
                .await;
            return;
        }
    };

    let ctx = Context::new(DecodingOptions::default());
    for entry in &entries {
        let value = decode_notification_entry(entry, &ctx);
        registry.deliver(subscription_id, value).await;
    }
}

fn decode_notification_entry(
    entry: &ExtensionObject,
    ctx: &Context<'_>,
) -> Result<NotificationValue, PublishError> {
    if entry.is_null() {
        return Err(PublishError::Message(
            "missing NotificationData parameter".into(),
        ));
    }
    let object_id = ObjectId::try_from(&entry.type_id.node_id)
        .map_err(|_| PublishError::Message("unknown NotificationData parameter".into()))?;
    match object_id {
        ObjectId::DataChangeNotification_Encoding_DefaultBinary => entry
            .decode_inner::<DataChangeNotification>(ctx)
            .map(NotificationValue::DataChange)
            .map_err(|e| PublishError::Status(e.status())),
        ObjectId::EventNotificationList_Encoding_DefaultBinary => entry
            .decode_inner::<EventNotificationList>(ctx)
            .map(NotificationValue::Event)
            .map_err(|e| PublishError::Status(e.status())),
        ObjectId::StatusChangeNotification_Encoding_DefaultBinary => entry
            .decode_inner::<StatusChangeNotification>(ctx)
            .map(NotificationValue::StatusChange)
            .map_err(|e| PublishError::Status(e.status())),
        _ => Err(PublishError::Message(
            "unknown NotificationData parameter".into(),
        )),
    }
}

trait StatusOkExt {
    fn status_ok(self) -> Result<(), StatusCode>;
}

impl StatusOkExt for StatusCode {
    fn status_ok(self) -> Result<(), StatusCode> {
        if self.is_good() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_set_matches_available_sequence_numbers() {
        let available = vec![7u32, 9, 12];
        let acks: Vec<SubscriptionAcknowledgement> = available
            .into_iter()
            .map(|sequence_number| SubscriptionAcknowledgement {
                subscription_id: 3,
                sequence_number,
            })
            .collect();
        assert_eq!(acks.len(), 3);
        assert!(acks
            .iter()
            .all(|ack| ack.subscription_id == 3));
        assert_eq!(
            acks.iter().map(|a| a.sequence_number).collect::<Vec<_>>(),
            vec![7, 9, 12]
        );
    }

    #[test]
    fn default_params_request_publishing_enabled() {
        let params = SubscriptionParams::default();
        assert!(params.publishing_enabled);
        assert_eq!(params.priority, 0);
    }

    #[test]
    fn decode_notification_entry_rejects_null_extension_object() {
        let ctx = Context::new(DecodingOptions::default());
        let err = decode_notification_entry(&ExtensionObject::null(), &ctx).unwrap_err();
        assert!(matches!(err, PublishError::Message(m) if m == "missing NotificationData parameter"));
    }

    #[test]
    fn decode_notification_entry_rejects_unknown_type_id() {
        let ctx = Context::new(DecodingOptions::default());
        let entry = ExtensionObject::from_message(
            opcua_types::ExpandedNodeId::from(opcua_types::NodeId::from(
                ObjectId::ReadRequest_Encoding_DefaultBinary,
            )),
            &opcua_types::service_types::ReadRequest::default(),
            &ctx,
        );
        let err = decode_notification_entry(&entry, &ctx).unwrap_err();
        assert!(matches!(err, PublishError::Message(m) if m == "unknown NotificationData parameter"));
    }

    #[test]
    fn decode_notification_entry_decodes_data_change_notification() {
        let ctx = Context::new(DecodingOptions::default());
        let notification = DataChangeNotification {
            monitored_items: None,
            diagnostic_infos: None,
        };
        let entry = ExtensionObject::from_message(
            opcua_types::ExpandedNodeId::from(opcua_types::NodeId::from(
                ObjectId::DataChangeNotification_Encoding_DefaultBinary,
            )),
            &notification,
            &ctx,
        );
        let value = decode_notification_entry(&entry, &ctx).unwrap();
        assert!(matches!(value, NotificationValue::DataChange(_)));
    }
}
