// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Request, response, and supporting structure types for the services this
//! client implements.
//!
//! The full OPC UA services catalog runs to dozens of services and
//! hundreds of supporting structures, generated from the foundation's XML
//! schema. This module only carries the services the client facade
//! actually issues: secure channel lifecycle, session lifecycle, endpoint
//! discovery, attribute read/write, browse, history read, subscriptions,
//! and publish/republish.

mod attributes;
mod browse;
mod endpoints;
mod fault;
mod identity_tokens;
mod secure_channel;
mod session;
mod subscriptions;

pub use attributes::{
    HistoryReadRequest, HistoryReadResponse, HistoryReadResult, HistoryReadValueId,
    ReadRawModifiedDetails, ReadRequest, ReadResponse, ReadValueId, WriteRequest, WriteResponse,
    WriteValue,
};
pub use browse::{
    BrowseDescription, BrowseRequest, BrowseResponse, BrowseResult, ReferenceDescription,
    ViewDescription,
};
pub use endpoints::{
    ApplicationDescription, EndpointDescription, GetEndpointsRequest, GetEndpointsResponse,
    UserTokenPolicy,
};
pub use fault::ServiceFault;
pub use identity_tokens::{
    AnonymousIdentityToken, IssuedIdentityToken, SignatureData, UserNameIdentityToken,
    X509IdentityToken,
};
pub use secure_channel::{
    ChannelSecurityToken, CloseSecureChannelRequest, CloseSecureChannelResponse,
    OpenSecureChannelRequest, OpenSecureChannelResponse,
};
pub use session::{
    ActivateSessionRequest, ActivateSessionResponse, CloseSessionRequest, CloseSessionResponse,
    CreateSessionRequest, CreateSessionResponse, SignedSoftwareCertificate,
};
pub use subscriptions::{
    CreateMonitoredItemsRequest, CreateMonitoredItemsResponse, CreateSubscriptionRequest,
    CreateSubscriptionResponse, DataChangeNotification, DeleteSubscriptionsRequest,
    DeleteSubscriptionsResponse, EventFieldList, EventNotificationList,
    MonitoredItemCreateRequest, MonitoredItemCreateResult, MonitoredItemNotification,
    MonitoringParameters, NotificationMessage, PublishRequest, PublishResponse, RepublishRequest,
    RepublishResponse, StatusChangeNotification, SubscriptionAcknowledgement,
};

use crate::object_id::ObjectId;

/// Associates a request or response structure with the numeric id used to
/// tag it inside an `ExtensionObject`, so the secure channel and session
/// layers can dispatch decoded messages without a separate registry.
pub trait MessageInfo {
    /// The binary encoding id for this message type.
    fn type_id(&self) -> ObjectId;
}
