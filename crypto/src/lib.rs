// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Security policies, asymmetric/symmetric key wrappers, certificate
//! handling, and random nonce generation for the OPC UA secure channel and
//! session layers.

pub mod aeskey;
pub mod certificate_store;
pub mod pkey;
pub mod random;
pub mod security_policy;
pub mod x509;

pub use aeskey::AesKey;
pub use certificate_store::CertificateStore;
pub use pkey::{PrivateKey, PublicKey};
pub use security_policy::SecurityPolicy;
pub use x509::{Thumbprint, X509};
