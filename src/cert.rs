// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Certificate material for the broker connection.
//!
//! The login exchange names a certificate identifier; the matching client
//! certificate and private key must already be in the caller's possession
//! (the platform never serves them). A [`CertificateStore`] resolves that
//! identifier to the PEM material used for the mutual-TLS broker connection.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::AuthError;

/// PEM-encoded TLS material for one broker identity.
#[derive(Debug, Clone)]
pub struct TlsIdentity {
    /// Client certificate chain.
    pub certificate: Vec<u8>,
    /// Client private key.
    pub private_key: Vec<u8>,
    /// Root CA the broker endpoint chains to.
    pub root_ca: Vec<u8>,
}

/// Resolves a certificate identifier to TLS material.
///
/// Implementations must be cheap enough to call on every login exchange.
pub trait CertificateStore: Send + Sync + 'static {
    /// Loads the identity for a certificate identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CertificateUnavailable`] if the identifier is
    /// unknown, or [`AuthError::CertificateRead`] if material exists but
    /// cannot be read.
    fn load(&self, certificate_id: &str) -> Result<TlsIdentity, AuthError>;
}

/// A certificate store backed by a directory of PEM files.
///
/// For a certificate identifier `X`, the store reads `<dir>/X.pem` (client
/// certificate) and `<dir>/X.pkey` (private key). The root CA is a single
/// shared file in the same directory, `AmazonRootCA1.pem` by default.
///
/// # Examples
///
/// ```no_run
/// use govee_cloud::cert::{CertificateStore, DirCertificateStore};
///
/// let store = DirCertificateStore::new("certs");
/// let identity = store.load("testiot.cert")?;
/// # Ok::<(), govee_cloud::error::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirCertificateStore {
    dir: PathBuf,
    root_ca_file: String,
}

impl DirCertificateStore {
    /// Creates a store reading from the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            root_ca_file: "AmazonRootCA1.pem".to_string(),
        }
    }

    /// Overrides the root CA file name.
    #[must_use]
    pub fn with_root_ca_file(mut self, file_name: impl Into<String>) -> Self {
        self.root_ca_file = file_name.into();
        self
    }

    fn read(&self, certificate_id: &str, file_name: &str) -> Result<Vec<u8>, AuthError> {
        let path = self.dir.join(file_name);
        if !path.is_file() {
            return Err(AuthError::CertificateUnavailable {
                certificate_id: certificate_id.to_string(),
            });
        }
        std::fs::read(&path).map_err(|source| AuthError::CertificateRead {
            certificate_id: certificate_id.to_string(),
            source,
        })
    }
}

impl CertificateStore for DirCertificateStore {
    fn load(&self, certificate_id: &str) -> Result<TlsIdentity, AuthError> {
        Ok(TlsIdentity {
            certificate: self.read(certificate_id, &format!("{certificate_id}.pem"))?,
            private_key: self.read(certificate_id, &format!("{certificate_id}.pkey"))?,
            root_ca: self.read(certificate_id, &self.root_ca_file)?,
        })
    }
}

/// An in-memory certificate store.
///
/// Useful for tests and for embedders that manage certificate material
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticCertificateStore {
    identities: HashMap<String, TlsIdentity>,
}

impl StaticCertificateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identity under the given certificate identifier.
    #[must_use]
    pub fn with_identity(mut self, certificate_id: impl Into<String>, identity: TlsIdentity) -> Self {
        self.identities.insert(certificate_id.into(), identity);
        self
    }
}

impl CertificateStore for StaticCertificateStore {
    fn load(&self, certificate_id: &str) -> Result<TlsIdentity, AuthError> {
        self.identities
            .get(certificate_id)
            .cloned()
            .ok_or_else(|| AuthError::CertificateUnavailable {
                certificate_id: certificate_id.to_string(),
            })
    }
}
