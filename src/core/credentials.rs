//! API key discovery.
//!
//! The key is looked up in a fixed chain of sources and the first one that
//! yields a non-empty value wins:
//!
//! 1. the managed secret store (OS keyring),
//! 2. `.secrets/secrets.toml`,
//! 3. `.streamlit/secrets.toml`,
//! 4. the `GEMINI_API_KEY` environment variable.
//!
//! The two files are read with a deliberately loose line rule rather than a
//! TOML parser so that hand-edited files which are not valid TOML still work.

use crate::core::keyring::SecretStore;
use crate::utils::auth::mask_key;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the API key in every source.
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";
pub const PRIMARY_SECRETS_FILE: &str = ".secrets/secrets.toml";
pub const SECONDARY_SECRETS_FILE: &str = ".streamlit/secrets.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    SecretStore,
    PrimaryFile,
    SecondaryFile,
    Environment,
}

impl CredentialSource {
    /// Resolution order, highest precedence first.
    pub const CHAIN: [CredentialSource; 4] = [
        CredentialSource::SecretStore,
        CredentialSource::PrimaryFile,
        CredentialSource::SecondaryFile,
        CredentialSource::Environment,
    ];

    pub fn file_path(self) -> Option<&'static str> {
        match self {
            CredentialSource::PrimaryFile => Some(PRIMARY_SECRETS_FILE),
            CredentialSource::SecondaryFile => Some(SECONDARY_SECRETS_FILE),
            CredentialSource::SecretStore | CredentialSource::Environment => None,
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::SecretStore => write!(f, "secret store"),
            CredentialSource::PrimaryFile => write!(f, "{PRIMARY_SECRETS_FILE}"),
            CredentialSource::SecondaryFile => write!(f, "{SECONDARY_SECRETS_FILE}"),
            CredentialSource::Environment => write!(f, "environment variable {API_KEY_NAME}"),
        }
    }
}

/// The resolved API key and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    source: CredentialSource,
    value: String,
}

impl Credential {
    pub fn new(source: CredentialSource, value: impl Into<String>) -> Self {
        Self {
            source,
            value: value.into(),
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn masked(&self) -> String {
        mask_key(&self.value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("value", &self.masked())
            .finish()
    }
}

/// A secrets file that exists but could not be read.
#[derive(Debug)]
pub struct SourceReadError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for SourceReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} but couldn't read it: {}",
            self.path.display(),
            self.source
        )
    }
}

impl Error for SourceReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// No source produced a key.
#[derive(Debug)]
pub struct CredentialError {
    /// Every location that was consulted, in order.
    pub checked: Vec<String>,
    /// Files that existed but could not be read.
    pub read_errors: Vec<SourceReadError>,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No API key found. Please add {API_KEY_NAME} to {PRIMARY_SECRETS_FILE} or {SECONDARY_SECRETS_FILE} (checked: {})",
            self.checked.join(", ")
        )?;
        for read_error in &self.read_errors {
            write!(f, "; {read_error}")?;
        }
        Ok(())
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.read_errors
            .first()
            .map(|err| err as &(dyn Error + 'static))
    }
}

/// Outcome of a successful resolution: the key plus any non-fatal
/// problems met with higher-precedence sources on the way.
#[derive(Debug)]
pub struct Resolution {
    pub credential: Credential,
    pub warnings: Vec<SourceReadError>,
}

/// Extract `key`'s value from flat `KEY = "value"` text.
///
/// The first line that mentions `key` and contains `=` is split on its
/// first `=`; the right-hand side has surrounding whitespace, then double
/// quotes, then single quotes stripped. Returns `None` when no line
/// matches. An empty value is returned as `Some("")` so callers can tell
/// "present but blank" from "absent".
pub fn parse_flat_value(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .find(|line| line.contains(key) && line.contains('='))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| {
            value
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string()
        })
}

/// Looks up the API key across the fixed source chain.
pub struct CredentialResolver<'a> {
    store: &'a dyn SecretStore,
    base_dir: PathBuf,
}

impl<'a> CredentialResolver<'a> {
    /// `base_dir` anchors the two relative secrets files, normally the
    /// current working directory.
    pub fn new(store: &'a dyn SecretStore, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn secrets_file(&self, source: CredentialSource) -> Option<PathBuf> {
        source.file_path().map(|path| self.base_dir.join(path))
    }

    pub fn resolve(&self) -> Result<Resolution, CredentialError> {
        let mut read_errors = Vec::new();

        for source in CredentialSource::CHAIN {
            match self.lookup(source, &mut read_errors) {
                Some(value) if !value.is_empty() => {
                    let credential = Credential::new(source, value);
                    info!(
                        source = %source,
                        key = %credential.masked(),
                        "Resolved API key"
                    );
                    return Ok(Resolution {
                        credential,
                        warnings: read_errors,
                    });
                }
                Some(_) => debug!(source = %source, "Source had an empty API key"),
                None => debug!(source = %source, "Source had no API key"),
            }
        }

        Err(CredentialError {
            checked: self.checked_locations(),
            read_errors,
        })
    }

    fn lookup(
        &self,
        source: CredentialSource,
        read_errors: &mut Vec<SourceReadError>,
    ) -> Option<String> {
        match source {
            CredentialSource::SecretStore => match self.store.get_secret(API_KEY_NAME) {
                Ok(value) => value,
                Err(err) => {
                    // A missing or locked keyring must not block the file and env fallbacks
                    warn!(
                        recoverable = err.is_recoverable(),
                        error = %err,
                        "Secret store lookup failed"
                    );
                    None
                }
            },
            CredentialSource::PrimaryFile | CredentialSource::SecondaryFile => {
                let path = self.secrets_file(source)?;
                self.read_secrets_file(&path, read_errors)
            }
            CredentialSource::Environment => std::env::var(API_KEY_NAME).ok(),
        }
    }

    fn read_secrets_file(
        &self,
        path: &Path,
        read_errors: &mut Vec<SourceReadError>,
    ) -> Option<String> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => parse_flat_value(&contents, API_KEY_NAME),
            Err(source) => {
                warn!(path = %path.display(), error = %source, "Secrets file unreadable");
                read_errors.push(SourceReadError {
                    path: path.to_path_buf(),
                    source,
                });
                None
            }
        }
    }

    fn checked_locations(&self) -> Vec<String> {
        CredentialSource::CHAIN
            .iter()
            .map(|source| match source {
                CredentialSource::SecretStore => {
                    format!("{} entry {API_KEY_NAME}", self.store.describe())
                }
                CredentialSource::PrimaryFile | CredentialSource::SecondaryFile => self
                    .secrets_file(*source)
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
                CredentialSource::Environment => source.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keyring::{KeyringAccessError, NoSecretStore};
    use crate::utils::test_utils::{with_test_config_env, TestEnvVarGuard};
    use std::fs;

    struct FixedStore(Option<&'static str>);

    impl SecretStore for FixedStore {
        fn get_secret(&self, _name: &str) -> Result<Option<String>, KeyringAccessError> {
            Ok(self.0.map(str::to_string))
        }

        fn describe(&self) -> String {
            "fixed store".to_string()
        }
    }

    struct BrokenStore;

    impl SecretStore for BrokenStore {
        fn get_secret(&self, _name: &str) -> Result<Option<String>, KeyringAccessError> {
            let backend = io::Error::other("dbus unavailable");
            Err(keyring::Error::PlatformFailure(Box::new(backend)).into())
        }

        fn describe(&self) -> String {
            "broken store".to_string()
        }
    }

    fn write_secrets(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn parses_quoted_and_bare_values() {
        assert_eq!(
            parse_flat_value("GEMINI_API_KEY = \"abc123\"\n", API_KEY_NAME).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            parse_flat_value("GEMINI_API_KEY='abc123'", API_KEY_NAME).as_deref(),
            Some("abc123")
        );
        assert_eq!(
            parse_flat_value("GEMINI_API_KEY=abc123   ", API_KEY_NAME).as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn parser_splits_only_on_first_equals() {
        assert_eq!(
            parse_flat_value("GEMINI_API_KEY = \"abc==\"", API_KEY_NAME).as_deref(),
            Some("abc==")
        );
    }

    #[test]
    fn parser_uses_first_matching_line_and_ignores_others() {
        let contents = "OTHER = \"x\"\n[section]\nGEMINI_API_KEY = \"first\"\nGEMINI_API_KEY = \"second\"\n";
        assert_eq!(
            parse_flat_value(contents, API_KEY_NAME).as_deref(),
            Some("first")
        );
        assert_eq!(parse_flat_value("GEMINI_API_KEY\n", API_KEY_NAME), None);
        assert_eq!(parse_flat_value("", API_KEY_NAME), None);
    }

    #[test]
    fn blank_value_is_reported_as_empty() {
        assert_eq!(
            parse_flat_value("GEMINI_API_KEY = \"\"", API_KEY_NAME).as_deref(),
            Some("")
        );
    }

    #[test]
    fn secret_store_wins_over_every_other_source() {
        with_test_config_env(|dir| {
            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");
            write_secrets(dir, PRIMARY_SECRETS_FILE, "GEMINI_API_KEY = \"from-primary\"");
            write_secrets(dir, SECONDARY_SECRETS_FILE, "GEMINI_API_KEY = \"from-secondary\"");

            let store = FixedStore(Some("from-store"));
            let resolution = CredentialResolver::new(&store, dir).resolve().unwrap();

            assert_eq!(resolution.credential.source(), CredentialSource::SecretStore);
            assert_eq!(resolution.credential.value(), "from-store");
        });
    }

    #[test]
    fn primary_file_wins_over_secondary_and_env() {
        with_test_config_env(|dir| {
            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");
            write_secrets(dir, PRIMARY_SECRETS_FILE, "GEMINI_API_KEY = \"from-primary\"");
            write_secrets(dir, SECONDARY_SECRETS_FILE, "GEMINI_API_KEY = \"from-secondary\"");

            let resolution = CredentialResolver::new(&NoSecretStore, dir)
                .resolve()
                .unwrap();

            assert_eq!(resolution.credential.source(), CredentialSource::PrimaryFile);
            assert_eq!(resolution.credential.value(), "from-primary");
        });
    }

    #[test]
    fn secondary_file_wins_over_env() {
        with_test_config_env(|dir| {
            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");
            write_secrets(dir, SECONDARY_SECRETS_FILE, "GEMINI_API_KEY = \"from-secondary\"");

            let resolution = CredentialResolver::new(&NoSecretStore, dir)
                .resolve()
                .unwrap();

            assert_eq!(
                resolution.credential.source(),
                CredentialSource::SecondaryFile
            );
        });
    }

    #[test]
    fn environment_is_the_last_resort() {
        with_test_config_env(|dir| {
            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");

            let resolution = CredentialResolver::new(&NoSecretStore, dir)
                .resolve()
                .unwrap();

            assert_eq!(resolution.credential.source(), CredentialSource::Environment);
            assert_eq!(resolution.credential.value(), "from-env");
        });
    }

    #[test]
    fn empty_values_fall_through_to_lower_sources() {
        with_test_config_env(|dir| {
            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");
            write_secrets(dir, PRIMARY_SECRETS_FILE, "GEMINI_API_KEY = \"\"");

            let store = FixedStore(Some(""));
            let resolution = CredentialResolver::new(&store, dir).resolve().unwrap();

            assert_eq!(resolution.credential.source(), CredentialSource::Environment);
        });
    }

    #[test]
    fn broken_secret_store_does_not_block_fallbacks() {
        with_test_config_env(|dir| {
            write_secrets(dir, SECONDARY_SECRETS_FILE, "GEMINI_API_KEY = \"file-key\"");

            let resolution = CredentialResolver::new(&BrokenStore, dir)
                .resolve()
                .unwrap();

            assert_eq!(resolution.credential.value(), "file-key");
        });
    }

    #[test]
    fn missing_everywhere_names_all_checked_locations() {
        with_test_config_env(|dir| {
            let err = CredentialResolver::new(&FixedStore(None), dir)
                .resolve()
                .unwrap_err();

            assert_eq!(err.checked.len(), 4);
            let message = err.to_string();
            assert!(message.contains("fixed store"));
            assert!(message.contains(PRIMARY_SECRETS_FILE));
            assert!(message.contains(SECONDARY_SECRETS_FILE));
            assert!(message.contains("environment variable GEMINI_API_KEY"));
            assert!(err.read_errors.is_empty());
        });
    }

    #[test]
    fn unreadable_file_is_surfaced_and_chain_continues() {
        with_test_config_env(|dir| {
            // A directory where the file should be makes the read fail
            fs::create_dir_all(dir.join(PRIMARY_SECRETS_FILE)).unwrap();

            let err = CredentialResolver::new(&NoSecretStore, dir)
                .resolve()
                .unwrap_err();
            assert_eq!(err.read_errors.len(), 1);
            assert!(err.to_string().contains("couldn't read it"));
            assert!(err.source().is_some());

            let mut env = TestEnvVarGuard::new();
            env.set_var(API_KEY_NAME, "from-env");
            let resolution = CredentialResolver::new(&NoSecretStore, dir)
                .resolve()
                .unwrap();
            assert_eq!(resolution.credential.source(), CredentialSource::Environment);
            assert_eq!(resolution.warnings.len(), 1);
        });
    }

    #[test]
    fn debug_output_masks_the_key() {
        let credential = Credential::new(CredentialSource::Environment, "AIzaSySecretValue");
        let debug = format!("{credential:?}");
        assert!(debug.contains("AIzaSy..."));
        assert!(!debug.contains("SecretValue"));
    }
}
