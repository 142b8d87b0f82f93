// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Cryptographically strong random bytes, used for nonces and IVs.

use opcua_types::ByteString;

/// Fills the slice with cryptographically strong pseudo-random bytes.
pub fn bytes(bytes: &mut [u8]) {
    use rand::RngCore;

    let mut rng = rand::thread_rng();
    rng.fill_bytes(bytes);
}

/// Creates a byte string of the given length filled with random bytes.
/// Used to generate the client/server nonces exchanged during
/// `OpenSecureChannel` and `CreateSession`.
pub fn byte_string(number_of_bytes: usize) -> ByteString {
    let mut data = vec![0u8; number_of_bytes];
    bytes(&mut data);
    ByteString::from(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_string_has_requested_length() {
        let nonce = byte_string(32);
        assert_eq!(nonce.value.map(|v| v.len()), Some(32));
    }

    #[test]
    fn bytes_are_not_all_zero() {
        let mut buf = [0u8; 32];
        bytes(&mut buf);
        assert!(buf.iter().any(|b| *b != 0));
    }
}
