// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Subscription lifecycle, monitored items, and the publish/republish
//! exchange that delivers notifications.

use std::io::{Read, Write};

use crate::data_value::DataValue;
use crate::date_time::UtcTime;
use crate::diagnostic_info::DiagnosticInfo;
use crate::encoding::{BinaryDecodable, BinaryEncodable, EncodingResult};
use crate::enums::{MonitoringMode, TimestampsToReturn};
use crate::extension_object::ExtensionObject;
use crate::object_id::ObjectId;
use crate::request_header::RequestHeader;
use crate::response_header::ResponseHeader;
use crate::status_code::StatusCode;
use crate::variant::Variant;
use crate::Context;

use super::attributes::ReadValueId;
use super::MessageInfo;

/// Parameters controlling sampling, queueing, and filtering for a single
/// monitored item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoringParameters {
    pub client_handle: u32,
    pub sampling_interval: f64,
    pub filter: ExtensionObject,
    pub queue_size: u32,
    pub discard_oldest: bool,
}

impl BinaryEncodable for MonitoringParameters {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        4 + self.sampling_interval.byte_len(ctx) + self.filter.byte_len(ctx) + 4 + self.discard_oldest.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        crate::write_u32(stream, self.client_handle)?;
        self.sampling_interval.encode(stream, ctx)?;
        self.filter.encode(stream, ctx)?;
        crate::write_u32(stream, self.queue_size)?;
        self.discard_oldest.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for MonitoringParameters {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(MonitoringParameters {
            client_handle: crate::read_u32(stream)?,
            sampling_interval: f64::decode(stream, ctx)?,
            filter: ExtensionObject::decode(stream, ctx)?,
            queue_size: crate::read_u32(stream)?,
            discard_oldest: bool::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoredItemCreateRequest {
    pub item_to_monitor: ReadValueId,
    pub monitoring_mode: MonitoringMode,
    pub requested_parameters: MonitoringParameters,
}

impl BinaryEncodable for MonitoredItemCreateRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.item_to_monitor.byte_len(ctx)
            + self.monitoring_mode.byte_len(ctx)
            + self.requested_parameters.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.item_to_monitor.encode(stream, ctx)?;
        self.monitoring_mode.encode(stream, ctx)?;
        self.requested_parameters.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for MonitoredItemCreateRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(MonitoredItemCreateRequest {
            item_to_monitor: ReadValueId::decode(stream, ctx)?,
            monitoring_mode: MonitoringMode::decode(stream, ctx)?,
            requested_parameters: MonitoringParameters::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoredItemCreateResult {
    pub status_code: StatusCode,
    pub monitored_item_id: u32,
    pub revised_sampling_interval: f64,
    pub revised_queue_size: u32,
    pub filter_result: ExtensionObject,
}

impl BinaryEncodable for MonitoredItemCreateResult {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.status_code.bits().byte_len(ctx)
            + 4
            + self.revised_sampling_interval.byte_len(ctx)
            + 4
            + self.filter_result.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.status_code.bits().encode(stream, ctx)?;
        crate::write_u32(stream, self.monitored_item_id)?;
        self.revised_sampling_interval.encode(stream, ctx)?;
        crate::write_u32(stream, self.revised_queue_size)?;
        self.filter_result.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for MonitoredItemCreateResult {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(MonitoredItemCreateResult {
            status_code: StatusCode::from_bits(u32::decode(stream, ctx)?),
            monitored_item_id: crate::read_u32(stream)?,
            revised_sampling_interval: f64::decode(stream, ctx)?,
            revised_queue_size: crate::read_u32(stream)?,
            filter_result: ExtensionObject::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateMonitoredItemsRequest {
    pub request_header: RequestHeader,
    pub subscription_id: u32,
    pub timestamps_to_return: TimestampsToReturn,
    pub items_to_create: Option<Vec<MonitoredItemCreateRequest>>,
}

impl MessageInfo for CreateMonitoredItemsRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateMonitoredItemsRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateMonitoredItemsRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + 4
            + self.timestamps_to_return.byte_len(ctx)
            + self.items_to_create.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        crate::write_u32(stream, self.subscription_id)?;
        self.timestamps_to_return.encode(stream, ctx)?;
        self.items_to_create.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateMonitoredItemsRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateMonitoredItemsRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            subscription_id: crate::read_u32(stream)?,
            timestamps_to_return: TimestampsToReturn::decode(stream, ctx)?,
            items_to_create: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateMonitoredItemsResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<MonitoredItemCreateResult>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for CreateMonitoredItemsResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateMonitoredItemsResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateMonitoredItemsResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.results.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateMonitoredItemsResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateMonitoredItemsResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSubscriptionRequest {
    pub request_header: RequestHeader,
    pub requested_publishing_interval: f64,
    pub requested_lifetime_count: u32,
    pub requested_max_keep_alive_count: u32,
    pub max_notifications_per_publish: u32,
    pub publishing_enabled: bool,
    pub priority: u8,
}

impl MessageInfo for CreateSubscriptionRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateSubscriptionRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateSubscriptionRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx)
            + self.requested_publishing_interval.byte_len(ctx)
            + 4
            + 4
            + 4
            + self.publishing_enabled.byte_len(ctx)
            + 1
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.requested_publishing_interval.encode(stream, ctx)?;
        crate::write_u32(stream, self.requested_lifetime_count)?;
        crate::write_u32(stream, self.requested_max_keep_alive_count)?;
        crate::write_u32(stream, self.max_notifications_per_publish)?;
        self.publishing_enabled.encode(stream, ctx)?;
        self.priority.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateSubscriptionRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateSubscriptionRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            requested_publishing_interval: f64::decode(stream, ctx)?,
            requested_lifetime_count: crate::read_u32(stream)?,
            requested_max_keep_alive_count: crate::read_u32(stream)?,
            max_notifications_per_publish: crate::read_u32(stream)?,
            publishing_enabled: bool::decode(stream, ctx)?,
            priority: u8::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateSubscriptionResponse {
    pub response_header: ResponseHeader,
    pub subscription_id: u32,
    pub revised_publishing_interval: f64,
    pub revised_lifetime_count: u32,
    pub revised_max_keep_alive_count: u32,
}

impl MessageInfo for CreateSubscriptionResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::CreateSubscriptionResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for CreateSubscriptionResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + 4 + self.revised_publishing_interval.byte_len(ctx) + 4 + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        crate::write_u32(stream, self.subscription_id)?;
        self.revised_publishing_interval.encode(stream, ctx)?;
        crate::write_u32(stream, self.revised_lifetime_count)?;
        crate::write_u32(stream, self.revised_max_keep_alive_count)?;
        Ok(())
    }
}

impl BinaryDecodable for CreateSubscriptionResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(CreateSubscriptionResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            subscription_id: crate::read_u32(stream)?,
            revised_publishing_interval: f64::decode(stream, ctx)?,
            revised_lifetime_count: crate::read_u32(stream)?,
            revised_max_keep_alive_count: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteSubscriptionsRequest {
    pub request_header: RequestHeader,
    pub subscription_ids: Option<Vec<u32>>,
}

impl MessageInfo for DeleteSubscriptionsRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::DeleteSubscriptionsRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for DeleteSubscriptionsRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + self.subscription_ids.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.subscription_ids.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for DeleteSubscriptionsRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(DeleteSubscriptionsRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            subscription_ids: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeleteSubscriptionsResponse {
    pub response_header: ResponseHeader,
    pub results: Option<Vec<StatusCode>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for DeleteSubscriptionsResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::DeleteSubscriptionsResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for DeleteSubscriptionsResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.results.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for DeleteSubscriptionsResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(DeleteSubscriptionsResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// Tells the server which notifications the client has received, so it can
/// free queued copies and advance the subscription's retransmission queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubscriptionAcknowledgement {
    pub subscription_id: u32,
    pub sequence_number: u32,
}

impl BinaryEncodable for SubscriptionAcknowledgement {
    fn byte_len(&self, _ctx: &Context<'_>) -> usize {
        8
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, _ctx: &Context<'_>) -> EncodingResult<()> {
        crate::write_u32(stream, self.subscription_id)?;
        crate::write_u32(stream, self.sequence_number)?;
        Ok(())
    }
}

impl BinaryDecodable for SubscriptionAcknowledgement {
    fn decode<S: Read + ?Sized>(stream: &mut S, _ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(SubscriptionAcknowledgement {
            subscription_id: crate::read_u32(stream)?,
            sequence_number: crate::read_u32(stream)?,
        })
    }
}

/// One value change, carried inside a `DataChangeNotification`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitoredItemNotification {
    pub client_handle: u32,
    pub value: DataValue,
}

impl BinaryEncodable for MonitoredItemNotification {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        4 + self.value.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        crate::write_u32(stream, self.client_handle)?;
        self.value.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for MonitoredItemNotification {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(MonitoredItemNotification {
            client_handle: crate::read_u32(stream)?,
            value: DataValue::decode(stream, ctx)?,
        })
    }
}

/// The notification body delivered for data-change monitored items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataChangeNotification {
    pub monitored_items: Option<Vec<MonitoredItemNotification>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for DataChangeNotification {
    fn type_id(&self) -> ObjectId {
        ObjectId::DataChangeNotification_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for DataChangeNotification {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.monitored_items.byte_len(ctx) + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.monitored_items.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for DataChangeNotification {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(DataChangeNotification {
            monitored_items: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// One event, carried inside an `EventNotificationList`, as the flat array
/// of field values the client asked for when creating the monitored item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventFieldList {
    pub client_handle: u32,
    pub event_fields: Option<Vec<Variant>>,
}

impl BinaryEncodable for EventFieldList {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        4 + self.event_fields.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        crate::write_u32(stream, self.client_handle)?;
        self.event_fields.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for EventFieldList {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(EventFieldList {
            client_handle: crate::read_u32(stream)?,
            event_fields: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// The notification body delivered for event monitored items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventNotificationList {
    pub events: Option<Vec<EventFieldList>>,
}

impl MessageInfo for EventNotificationList {
    fn type_id(&self) -> ObjectId {
        ObjectId::EventNotificationList_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for EventNotificationList {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.events.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.events.encode(stream, ctx)
    }
}

impl BinaryDecodable for EventNotificationList {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(EventNotificationList {
            events: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

/// Reports that a subscription's status changed (e.g. it will be deleted
/// for lack of a publish), delivered in place of data or event
/// notifications.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusChangeNotification {
    pub status: StatusCode,
    pub diagnostic_info: DiagnosticInfo,
}

impl MessageInfo for StatusChangeNotification {
    fn type_id(&self) -> ObjectId {
        ObjectId::StatusChangeNotification_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for StatusChangeNotification {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.status.bits().byte_len(ctx) + self.diagnostic_info.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.status.bits().encode(stream, ctx)?;
        self.diagnostic_info.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for StatusChangeNotification {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(StatusChangeNotification {
            status: StatusCode::from_bits(u32::decode(stream, ctx)?),
            diagnostic_info: DiagnosticInfo::decode(stream, ctx)?,
        })
    }
}

/// A batch of notifications for one publish cycle, tagged with the
/// sequence number the client acknowledges in its next `PublishRequest`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NotificationMessage {
    pub sequence_number: u32,
    pub publish_time: UtcTime,
    pub notification_data: Option<Vec<ExtensionObject>>,
}

impl BinaryEncodable for NotificationMessage {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        4 + self.publish_time.byte_len(ctx) + self.notification_data.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        crate::write_u32(stream, self.sequence_number)?;
        self.publish_time.encode(stream, ctx)?;
        self.notification_data.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for NotificationMessage {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(NotificationMessage {
            sequence_number: crate::read_u32(stream)?,
            publish_time: UtcTime::decode(stream, ctx)?,
            notification_data: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishRequest {
    pub request_header: RequestHeader,
    pub subscription_acknowledgements: Option<Vec<SubscriptionAcknowledgement>>,
}

impl MessageInfo for PublishRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::PublishRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for PublishRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + self.subscription_acknowledgements.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        self.subscription_acknowledgements.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for PublishRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(PublishRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            subscription_acknowledgements: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PublishResponse {
    pub response_header: ResponseHeader,
    pub subscription_id: u32,
    pub available_sequence_numbers: Option<Vec<u32>>,
    pub more_notifications: bool,
    pub notification_message: NotificationMessage,
    pub results: Option<Vec<StatusCode>>,
    pub diagnostic_infos: Option<Vec<DiagnosticInfo>>,
}

impl MessageInfo for PublishResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::PublishResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for PublishResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx)
            + 4
            + self.available_sequence_numbers.byte_len(ctx)
            + self.more_notifications.byte_len(ctx)
            + self.notification_message.byte_len(ctx)
            + self.results.byte_len(ctx)
            + self.diagnostic_infos.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        crate::write_u32(stream, self.subscription_id)?;
        self.available_sequence_numbers.encode(stream, ctx)?;
        self.more_notifications.encode(stream, ctx)?;
        self.notification_message.encode(stream, ctx)?;
        self.results.encode(stream, ctx)?;
        self.diagnostic_infos.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for PublishResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(PublishResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            subscription_id: crate::read_u32(stream)?,
            available_sequence_numbers: BinaryDecodable::decode(stream, ctx)?,
            more_notifications: bool::decode(stream, ctx)?,
            notification_message: NotificationMessage::decode(stream, ctx)?,
            results: BinaryDecodable::decode(stream, ctx)?,
            diagnostic_infos: BinaryDecodable::decode(stream, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepublishRequest {
    pub request_header: RequestHeader,
    pub subscription_id: u32,
    pub retransmit_sequence_number: u32,
}

impl MessageInfo for RepublishRequest {
    fn type_id(&self) -> ObjectId {
        ObjectId::RepublishRequest_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for RepublishRequest {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.request_header.byte_len(ctx) + 4 + 4
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.request_header.encode(stream, ctx)?;
        crate::write_u32(stream, self.subscription_id)?;
        crate::write_u32(stream, self.retransmit_sequence_number)?;
        Ok(())
    }
}

impl BinaryDecodable for RepublishRequest {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(RepublishRequest {
            request_header: RequestHeader::decode(stream, ctx)?,
            subscription_id: crate::read_u32(stream)?,
            retransmit_sequence_number: crate::read_u32(stream)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepublishResponse {
    pub response_header: ResponseHeader,
    pub notification_message: NotificationMessage,
}

impl MessageInfo for RepublishResponse {
    fn type_id(&self) -> ObjectId {
        ObjectId::RepublishResponse_Encoding_DefaultBinary
    }
}

impl BinaryEncodable for RepublishResponse {
    fn byte_len(&self, ctx: &Context<'_>) -> usize {
        self.response_header.byte_len(ctx) + self.notification_message.byte_len(ctx)
    }

    fn encode<S: Write + ?Sized>(&self, stream: &mut S, ctx: &Context<'_>) -> EncodingResult<()> {
        self.response_header.encode(stream, ctx)?;
        self.notification_message.encode(stream, ctx)?;
        Ok(())
    }
}

impl BinaryDecodable for RepublishResponse {
    fn decode<S: Read + ?Sized>(stream: &mut S, ctx: &Context<'_>) -> EncodingResult<Self> {
        Ok(RepublishResponse {
            response_header: ResponseHeader::decode(stream, ctx)?,
            notification_message: NotificationMessage::decode(stream, ctx)?,
        })
    }
}
