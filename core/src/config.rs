// OPC UA client
// SPDX-License-Identifier: MPL-2.0

//! Common utilities for loading and saving YAML configuration files, shared
//! by whatever client-facing config struct the caller defines.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use opcua_types::{ApplicationDescription, ApplicationType, LocalizedText, UAString};

/// Error returned from saving or loading a config object.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration failed validation; holds the list of complaints.
    #[error("configuration is invalid: {0:?}")]
    Invalid(Vec<String>),
    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to serialize or deserialize the config object.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Handles loading, saving, and validating a client configuration object.
pub trait Config: serde::Serialize {
    /// Saves the configuration object to a YAML file, refusing to write an
    /// invalid config.
    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Err(e) = self.validate() {
            return Err(ConfigError::Invalid(e));
        }
        let s = serde_yaml::to_string(&self)?;
        let mut f = File::create(path)?;
        f.write_all(s.as_bytes())?;
        Ok(())
    }

    /// Loads a configuration object from a YAML file.
    fn load<A>(path: &Path) -> Result<A, ConfigError>
    where
        for<'de> A: Config + serde::Deserialize<'de>,
    {
        let mut f = File::open(path)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validates the config struct, returning the list of complaints if
    /// invalid.
    fn validate(&self) -> Result<(), Vec<String>>;

    /// The application name sent in `CreateSessionRequest`.
    fn application_name(&self) -> UAString;

    /// The application instance URI, matched against the certificate's
    /// subject alternative name.
    fn application_uri(&self) -> UAString;

    /// The product URI.
    fn product_uri(&self) -> UAString;

    /// Always `Client` for this crate, but kept as an override point for
    /// config types shared with a hypothetical server.
    fn application_type(&self) -> ApplicationType {
        ApplicationType::Client
    }

    /// Discovery URLs advertised for this application, if any.
    fn discovery_urls(&self) -> Option<Vec<UAString>> {
        None
    }

    /// Builds the `ApplicationDescription` sent in
    /// `CreateSessionRequest`/`GetEndpointsRequest`.
    fn application_description(&self) -> ApplicationDescription {
        ApplicationDescription {
            application_uri: self.application_uri(),
            application_name: LocalizedText::new("", self.application_name().as_ref()),
            application_type: self.application_type(),
            product_uri: self.product_uri(),
            gateway_server_uri: UAString::null(),
            discovery_profile_uri: UAString::null(),
            discovery_urls: self.discovery_urls(),
        }
    }
}
