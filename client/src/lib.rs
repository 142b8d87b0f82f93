// OPC UA client
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! An OPC UA client: secure channel lifecycle, session management, and
//! subscriptions, built on top of `opcua-core`'s chunking and `opcua-types`'
//! binary codec.

pub mod client;
pub mod config;
pub mod identity_token;
pub mod retry;
pub mod secure_channel;
pub mod session_manager;
pub mod subscriptions;
pub mod transport;

pub use client::Client;
pub use config::{ClientBuilder, ClientConfig, ClientEndpoint, ClientUserToken};
pub use identity_token::IdentityToken;
pub use retry::SessionRetryPolicy;
pub use secure_channel::AsyncSecureChannel;
pub use session_manager::{Session, SessionManager, SignatureVerificationPolicy};
pub use subscriptions::{PublishNotificationData, Subscription, SubscriptionRegistry};

/// Logs a warning tagged with the secure channel id the event concerns.
#[macro_export]
macro_rules! channel_warn {
    ($channel: expr, $msg: expr) => {
        log::warn!("channel:{} {}", $channel.channel_id(), $msg)
    };
    ($channel: expr, $fmt: expr, $($arg:tt)*) => {
        log::warn!(concat!("channel:{} ", $fmt), $channel.channel_id(), $($arg)*)
    };
}

/// Logs a debug-level message tagged with the secure channel id.
#[macro_export]
macro_rules! channel_debug {
    ($channel: expr, $msg: expr) => {
        log::debug!("channel:{} {}", $channel.channel_id(), $msg)
    };
    ($channel: expr, $fmt: expr, $($arg:tt)*) => {
        log::debug!(concat!("channel:{} ", $fmt), $channel.channel_id(), $($arg)*)
    };
}

/// Logs a trace-level message tagged with the secure channel id.
#[macro_export]
macro_rules! channel_trace {
    ($channel: expr, $msg: expr) => {
        log::trace!("channel:{} {}", $channel.channel_id(), $msg)
    };
    ($channel: expr, $fmt: expr, $($arg:tt)*) => {
        log::trace!(concat!("channel:{} ", $fmt), $channel.channel_id(), $($arg)*)
    };
}
