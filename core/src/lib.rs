// OPC UA client
// SPDX-License-Identifier: MPL-2.0

#![warn(missing_docs)]

//! Shared plumbing for the OPC UA client: message chunking, the secure
//! channel's cryptographic state, and the request/response message
//! envelopes the transport and session layers pass around.

/// Debugging helpers.
pub mod debug {
    use log::{log_enabled, trace};

    /// Logs a slice as a hex/ASCII dump at trace level, under the `hex`
    /// target, so it can be enabled independently of the rest of the
    /// client's logging.
    pub fn log_buffer(message: &str, buf: &[u8]) {
        if !log_enabled!(target: "hex", log::Level::Trace) {
            return;
        }

        let line_len = 32;
        let len = buf.len();
        let last_line_padding = ((len / line_len) + 1) * line_len - len;

        trace!(target: "hex", "{}", message);

        let mut char_line = String::new();
        let mut hex_line = format!("{:08x}: ", 0);

        for (i, b) in buf.iter().enumerate() {
            let value = *b;
            if i > 0 && i % line_len == 0 {
                trace!(target: "hex", "{} {}", hex_line, char_line);
                hex_line = format!("{:08x}: ", i);
                char_line.clear();
            }
            hex_line = format!("{} {:02x}", hex_line, value);
            char_line.push(if (32..=126).contains(&value) {
                value as char
            } else {
                '.'
            });
        }
        if last_line_padding > 0 {
            for _ in 0..last_line_padding {
                hex_line.push_str("   ");
            }
            trace!(target: "hex", "{} {}", hex_line, char_line);
        }
    }
}

pub mod comms;
pub mod config;
pub mod handle;
pub mod messages;

pub use messages::{Message, MessageType, RequestMessage, ResponseMessage};

/// Obtains a lock on a `Mutex`, as a single place to hook tracing into if a
/// deadlock ever needs tracking down.
#[macro_export]
macro_rules! trace_lock {
    ( $x:expr ) => {{
        $x.lock()
    }};
}

/// Obtains a read lock on a `RwLock`.
#[macro_export]
macro_rules! trace_read_lock {
    ( $x:expr ) => {{
        $x.read()
    }};
}

/// Obtains a write lock on a `RwLock`.
#[macro_export]
macro_rules! trace_write_lock {
    ( $x:expr ) => {{
        $x.write()
    }};
}

/// Synchronous locks used internally. `parking_lot`'s locks are not
/// poisonable, so a panicking holder can't wedge every future lock attempt.
pub mod sync {
    /// Read-write lock. Prefer this when reads dominate writes.
    pub type RwLock<T> = parking_lot::RwLock<T>;
    /// Mutually exclusive lock.
    pub type Mutex<T> = parking_lot::Mutex<T>;
}
