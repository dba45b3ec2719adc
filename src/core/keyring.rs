//! Managed secret storage backed by the platform keyring.

use keyring::Entry;
use std::error::Error;
use std::fmt;
use tracing::debug;

/// Keyring service name under which secrets are filed.
pub const KEYRING_SERVICE: &str = "artrestorer";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked or no secret service is running). Permanent errors surface the
/// underlying cause directly so callers can report them to the user.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, KeyringAccessError::Recoverable(_))
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// A store of named secrets.
pub trait SecretStore {
    /// Look up a secret; `Ok(None)` means the store has no entry for `name`.
    fn get_secret(&self, name: &str) -> Result<Option<String>, KeyringAccessError>;

    /// Human-readable description used in diagnostics.
    fn describe(&self) -> String;
}

/// [`SecretStore`] over the OS keyring (Secret Service, Keychain, Credential Manager).
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    pub fn store_secret(&self, name: &str, value: &str) -> Result<(), KeyringAccessError> {
        let entry = Entry::new(&self.service, name)?;
        entry.set_password(value)?;
        debug!(service = %self.service, name, "Stored secret in keyring");
        Ok(())
    }

    /// Remove a secret. Returns `false` when there was nothing to remove.
    pub fn delete_secret(&self, name: &str) -> Result<bool, KeyringAccessError> {
        let entry = Entry::new(&self.service, name)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringSecretStore {
    fn get_secret(&self, name: &str) -> Result<Option<String>, KeyringAccessError> {
        let entry = Entry::new(&self.service, name)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn describe(&self) -> String {
        format!("system keyring (service '{}')", self.service)
    }
}

/// A store that never holds anything, for `--env-only` style runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecretStore;

impl SecretStore for NoSecretStore {
    fn get_secret(&self, _name: &str) -> Result<Option<String>, KeyringAccessError> {
        Ok(None)
    }

    fn describe(&self) -> String {
        "system keyring (disabled)".to_string()
    }
}
