// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Loads the client's own application instance certificate and private
//! key from disk, the way the teacher's clients do for a quick-start run
//! against a server that requires anything above `SecurityPolicy::None`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use opcua_types::{Error, StatusCode};

use crate::pkey::PrivateKey;
use crate::x509::X509;

/// Where a client looks for its own application instance certificate and
/// private key, and (eventually) the server certificates it has chosen to
/// trust.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    pki_dir: PathBuf,
}

impl CertificateStore {
    /// Creates a store rooted at `pki_dir`, expecting `own/cert.der` and
    /// `private/private.pem` beneath it.
    pub fn new(pki_dir: impl Into<PathBuf>) -> CertificateStore {
        CertificateStore {
            pki_dir: pki_dir.into(),
        }
    }

    fn cert_path(&self) -> PathBuf {
        self.pki_dir.join("own").join("cert.der")
    }

    fn private_key_path(&self) -> PathBuf {
        self.pki_dir.join("private").join("private.pem")
    }

    /// Loads the client's certificate and private key from disk. Returns
    /// `None` if no certificate has been provisioned yet — callers running
    /// with `SecurityPolicy::None` don't need one.
    pub fn read_own_cert_and_key(&self) -> Result<Option<(X509, PrivateKey)>, Error> {
        let cert_path = self.cert_path();
        let key_path = self.private_key_path();
        if !cert_path.exists() || !key_path.exists() {
            return Ok(None);
        }

        let der = fs::read(&cert_path).map_err(|e| {
            Error::new(
                StatusCode::BadCertificateInvalid,
                format!("could not read {}: {}", cert_path.display(), e),
            )
        })?;
        let pem = fs::read_to_string(&key_path).map_err(|e| {
            Error::new(
                StatusCode::BadCertificateInvalid,
                format!("could not read {}: {}", key_path.display(), e),
            )
        })?;

        let cert = X509::from_der(&der)?;
        let key = PrivateKey::from_pem(&pem)?;
        info!("loaded application instance certificate from {}", cert_path.display());
        Ok(Some((cert, key)))
    }

    /// Saves a freshly generated certificate and key pair, creating the
    /// `own/` and `private/` subdirectories as needed.
    pub fn write_own_cert_and_key(&self, der: &[u8], pem: &str) -> Result<(), Error> {
        write_file(&self.cert_path(), der)?;
        write_file(&self.private_key_path(), pem.as_bytes())?;
        Ok(())
    }

    /// Returns the trusted-server-certificate directory, creating it if
    /// absent. Certificates placed here by the operator are implicitly
    /// trusted; this store does not walk a CA chain or check revocation
    /// lists.
    pub fn trusted_dir(&self) -> PathBuf {
        self.pki_dir.join("trusted")
    }

    /// Checks whether `cert`'s DER bytes match a file already present in
    /// the trusted-certificates directory.
    pub fn is_trusted(&self, cert: &X509) -> bool {
        let dir = self.trusted_dir();
        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };
        let der = cert.as_byte_string();
        for entry in entries.flatten() {
            if let Ok(contents) = fs::read(entry.path()) {
                if contents == der.value.clone().unwrap_or_default() {
                    return true;
                }
            }
        }
        warn!(
            "server certificate not found in {}; treating as untrusted",
            dir.display()
        );
        false
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::new(
                StatusCode::BadUnexpectedError,
                format!("could not create {}: {}", parent.display(), e),
            )
        })?;
    }
    fs::write(path, contents).map_err(|e| {
        Error::new(
            StatusCode::BadUnexpectedError,
            format!("could not write {}: {}", path.display(), e),
        )
    })
}
