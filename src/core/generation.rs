//! Fail-soft text generation.
//!
//! Credential lookup and model selection run once in [`GenerationClient::bootstrap`];
//! the outcome is fixed for the rest of the process. [`GenerationClient::generate`]
//! never fails: configuration problems and request errors both come back as
//! displayable text.

use crate::api::{ApiError, GeminiClient};
use crate::core::config::Config;
use crate::core::credentials::{
    Credential, CredentialResolver, CredentialSource, PRIMARY_SECRETS_FILE, SECONDARY_SECRETS_FILE,
};
use crate::core::keyring::SecretStore;
use crate::core::models::{select_model, ModelSelection, SelectionError};
use crate::core::profile::UserProfile;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// Something that can turn a prompt into text with a named model.
#[async_trait]
pub trait TextBackend: Send + Sync {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, ApiError>;
}

/// Profile conditioning header followed by the caller's prompt body.
pub fn system_prompt(profile: &UserProfile, body: &str) -> String {
    format!(
        "You are an art restoration expert.\nUser profile: {} level\nTone: {}\nCreativity: {}/10\nDetail: {}/10\n\n{}",
        profile.experience, profile.tone, profile.creativity, profile.length, body
    )
}

/// Text returned in place of a response when no model could be selected.
pub fn configuration_diagnostic(error: &SelectionError) -> String {
    let mut message = format!("⚠️ API Configuration Error: {error}\n\n");
    let discovered = error.discovered();
    if !discovered.is_empty() {
        message.push_str(&format!(
            "Available models found: {}\n\n",
            discovered.join(", ")
        ));
    }
    message.push_str(&format!(
        "Please check:\n1. Your API key is valid (get from: {API_KEY_URL})\n2. You have enabled the Gemini API\n3. Add to {PRIMARY_SECRETS_FILE}:\n   GEMINI_API_KEY = \"your-key-here\"\n"
    ));
    message
}

/// What was learned about the API key during bootstrap, safe to display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiagnostics {
    pub source: Option<CredentialSource>,
    pub masked_prefix: Option<String>,
    pub length: usize,
    pub primary_file_exists: bool,
    pub secondary_file_exists: bool,
}

impl KeyDiagnostics {
    fn probe(resolver: &CredentialResolver<'_>) -> Self {
        let exists = |source| {
            resolver
                .secrets_file(source)
                .is_some_and(|path| path.exists())
        };
        Self {
            primary_file_exists: exists(CredentialSource::PrimaryFile),
            secondary_file_exists: exists(CredentialSource::SecondaryFile),
            ..Self::default()
        }
    }

    fn record(&mut self, credential: &Credential) {
        self.source = Some(credential.source());
        self.masked_prefix = Some(credential.masked());
        self.length = credential.value().chars().count();
    }

    pub fn key_found(&self) -> bool {
        self.source.is_some()
    }
}

/// Snapshot of the bootstrap outcome for the welcome page and `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiStatus {
    pub model: Result<String, String>,
    pub discovered: Vec<String>,
    pub key: KeyDiagnostics,
}

impl ApiStatus {
    pub fn is_configured(&self) -> bool {
        self.model.is_ok()
    }

    /// Human-readable report, one line per entry.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.model {
            Ok(model) => {
                lines.push("✅ API configured successfully".to_string());
                lines.push(format!("Using model: {model}"));
                return lines;
            }
            Err(error) => lines.push(format!("⚠️ API configuration issue: {error}")),
        }

        if !self.discovered.is_empty() {
            lines.push(format!(
                "Found {} available models, but couldn't initialize:",
                self.discovered.len()
            ));
            lines.extend(self.discovered.iter().map(|name| format!("  - {name}")));
        }

        lines.push("How to fix:".to_string());
        lines.push(format!("  1. Create an API key at {API_KEY_URL}"));
        lines.push(format!(
            "  2. Add it to {PRIMARY_SECRETS_FILE} as GEMINI_API_KEY = \"...\" (or run `artrestorer auth`)"
        ));
        lines.push("  3. Restart artrestorer".to_string());

        lines.push("Debug information:".to_string());
        let key = &self.key;
        lines.push(format!(
            "  API key found: {}",
            if key.key_found() { "Yes" } else { "No" }
        ));
        if let Some(source) = key.source {
            lines.push(format!("  API key source: {source}"));
        }
        if let Some(prefix) = &key.masked_prefix {
            lines.push(format!("  API key starts with: {prefix}"));
            lines.push(format!("  API key length: {} characters", key.length));
        }
        lines.push(format!("  Available models: {}", self.discovered.len()));
        lines.push(format!(
            "  {PRIMARY_SECRETS_FILE} exists: {}",
            key.primary_file_exists
        ));
        lines.push(format!(
            "  {SECONDARY_SECRETS_FILE} exists: {}",
            key.secondary_file_exists
        ));
        lines
    }
}

enum ModelState {
    Ready {
        backend: Arc<dyn TextBackend>,
        selection: ModelSelection,
    },
    Unavailable(SelectionError),
}

/// Generates guidance with the model chosen at startup.
pub struct GenerationClient {
    state: ModelState,
    key: KeyDiagnostics,
}

impl GenerationClient {
    /// Resolve the key, list models and pick one. Never fails; an unusable
    /// setup yields a client whose every answer is the configuration diagnostic.
    pub async fn bootstrap(config: &Config, store: &dyn SecretStore, base_dir: &Path) -> Self {
        let resolver = CredentialResolver::new(store, base_dir);
        let mut key = KeyDiagnostics::probe(&resolver);

        let resolution = match resolver.resolve() {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(error = %err, "No API key available");
                return Self::unavailable_with(
                    SelectionError::MissingCredential(err.to_string()),
                    key,
                );
            }
        };
        for skipped in &resolution.warnings {
            warn!(error = %skipped, "Skipped unreadable secrets file");
        }
        key.record(&resolution.credential);

        let base_url = config.api_base_url();
        let timeout = config.request_timeout();
        let client = match GeminiClient::new(&base_url, &resolution.credential, timeout) {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "Could not build HTTP client");
                return Self::unavailable_with(
                    SelectionError::Listing {
                        message: err.to_string(),
                        discovered: Vec::new(),
                    },
                    key,
                );
            }
        };
        debug!(base_url = %base_url, timeout_secs = client.timeout().as_secs(), "Listing models");

        match select_model(&client).await {
            Ok(selection) => Self {
                state: ModelState::Ready {
                    backend: Arc::new(client),
                    selection,
                },
                key,
            },
            Err(err) => Self::unavailable_with(err, key),
        }
    }

    /// A client that already has a backend and a selected model.
    pub fn with_backend(backend: Arc<dyn TextBackend>, selection: ModelSelection) -> Self {
        Self {
            state: ModelState::Ready { backend, selection },
            key: KeyDiagnostics::default(),
        }
    }

    /// A client with no usable model.
    pub fn unavailable(error: SelectionError) -> Self {
        Self::unavailable_with(error, KeyDiagnostics::default())
    }

    fn unavailable_with(error: SelectionError, key: KeyDiagnostics) -> Self {
        Self {
            state: ModelState::Unavailable(error),
            key,
        }
    }

    pub fn selection(&self) -> Result<&ModelSelection, &SelectionError> {
        match &self.state {
            ModelState::Ready { selection, .. } => Ok(selection),
            ModelState::Unavailable(err) => Err(err),
        }
    }

    pub fn status(&self) -> ApiStatus {
        let (model, discovered) = match &self.state {
            ModelState::Ready { selection, .. } => (
                Ok(selection.chosen.name.clone()),
                selection
                    .discovered
                    .iter()
                    .map(|model| model.name.clone())
                    .collect(),
            ),
            ModelState::Unavailable(err) => (Err(err.to_string()), err.discovered().to_vec()),
        };
        ApiStatus {
            model,
            discovered,
            key: self.key.clone(),
        }
    }

    /// Generate guidance for `prompt_body`, conditioned on `profile`.
    ///
    /// Every outcome is returned as text.
    pub async fn generate(&self, prompt_body: &str, profile: &UserProfile) -> String {
        let (backend, selection) = match &self.state {
            ModelState::Ready { backend, selection } => (backend, selection),
            ModelState::Unavailable(err) => {
                debug!(error = %err, "Generation requested without a model");
                return configuration_diagnostic(err);
            }
        };

        let model = selection.chosen.name.as_str();
        let prompt = system_prompt(profile, prompt_body);
        debug!(model, prompt_chars = prompt.chars().count(), "Sending generation request");

        match backend.generate_text(model, &prompt).await {
            Ok(text) => {
                info!(model, response_chars = text.chars().count(), "Generation succeeded");
                text
            }
            Err(err) => {
                warn!(model, error = %err, "Generation failed");
                format!("Error generating response: {err}")
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::keyring::NoSecretStore;
    use crate::core::models::ModelDescriptor;
    use crate::core::profile::{ExperienceLevel, Level, Tone};
    use crate::utils::test_utils::{create_test_profile, with_test_config_env};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records prompts and answers from a fixed script.
    pub(crate) struct ScriptedBackend {
        pub prompts: Mutex<Vec<(String, String)>>,
        reply: Result<String, fn() -> ApiError>,
    }

    impl ScriptedBackend {
        pub(crate) fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: Ok(text.to_string()),
            })
        }

        pub(crate) fn failing(error: fn() -> ApiError) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: Err(error),
            })
        }

        pub(crate) fn recorded(&self) -> Vec<(String, String)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextBackend for ScriptedBackend {
        async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, ApiError> {
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    pub(crate) fn selection(name: &str) -> ModelSelection {
        let chosen = ModelDescriptor {
            name: name.to_string(),
            display_name: None,
            supports_text_generation: true,
        };
        ModelSelection {
            discovered: vec![chosen.clone()],
            chosen,
        }
    }

    #[test]
    fn system_prompt_carries_profile_conditioning() {
        let mut profile = create_test_profile("Ada", "a@b.com");
        profile.experience = ExperienceLevel::Advanced;
        profile.tone = Tone::Simplified;
        profile.creativity = Level::try_from(8).unwrap();
        profile.length = Level::try_from(3).unwrap();

        assert_eq!(
            system_prompt(&profile, "Artwork: Mural"),
            "You are an art restoration expert.\nUser profile: advanced level\nTone: simplified\nCreativity: 8/10\nDetail: 3/10\n\nArtwork: Mural"
        );
    }

    #[tokio::test]
    async fn success_returns_text_verbatim() {
        let backend = ScriptedBackend::replying("  Use **Paraloid B-72**.\n");
        let client =
            GenerationClient::with_backend(backend.clone(), selection("models/gemini-pro"));
        let profile = create_test_profile("Ada", "a@b.com");

        let text = client.generate("Damage: cracks", &profile).await;

        assert_eq!(text, "  Use **Paraloid B-72**.\n");
        let recorded = backend.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "models/gemini-pro");
        assert!(recorded[0].1.starts_with("You are an art restoration expert."));
        assert!(recorded[0].1.ends_with("\n\nDamage: cracks"));
    }

    #[tokio::test]
    async fn call_failure_becomes_error_text() {
        let backend = ScriptedBackend::failing(|| ApiError::Timeout(Duration::from_secs(60)));
        let client = GenerationClient::with_backend(backend, selection("models/gemini-pro"));
        let profile = create_test_profile("Ada", "a@b.com");

        assert_eq!(
            client.generate("x", &profile).await,
            "Error generating response: request timed out after 60s"
        );
    }

    #[tokio::test]
    async fn missing_model_returns_diagnostic_with_discovered_names() {
        let client = GenerationClient::unavailable(SelectionError::Listing {
            message: "request timed out after 5s".to_string(),
            discovered: vec!["models/a".to_string(), "models/b".to_string()],
        });
        let profile = create_test_profile("Ada", "a@b.com");

        let text = client.generate("x", &profile).await;

        assert!(text.starts_with(
            "⚠️ API Configuration Error: Error listing models: request timed out after 5s\n\n"
        ));
        assert!(text.contains("Available models found: models/a, models/b\n\n"));
        assert!(text.contains("Please check:\n1. Your API key is valid"));
        assert!(text.ends_with("GEMINI_API_KEY = \"your-key-here\"\n"));
    }

    #[test]
    fn diagnostic_omits_model_line_when_none_were_found() {
        let text = configuration_diagnostic(&SelectionError::NoUsableModel);
        assert!(!text.contains("Available models found"));
    }

    #[test]
    fn bootstrap_without_any_key_is_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".streamlit")).unwrap();
        std::fs::write(dir.path().join(".streamlit/secrets.toml"), "OTHER = 1\n").unwrap();

        // Resolution fails before any network call, so this completes offline
        let client = with_test_config_env(|_| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(GenerationClient::bootstrap(
                    &Config::default(),
                    &NoSecretStore,
                    dir.path(),
                ))
        });

        let status = client.status();
        assert!(!status.is_configured());
        assert!(!status.key.key_found());
        assert!(!status.key.primary_file_exists);
        assert!(status.key.secondary_file_exists);
        assert!(matches!(
            client.selection(),
            Err(SelectionError::MissingCredential(_))
        ));
        let lines = status.lines();
        assert!(lines[0].starts_with("⚠️ API configuration issue: No API key found."));
        assert!(lines.contains(&"  API key found: No".to_string()));
    }

    #[test]
    fn configured_status_reports_model() {
        let client = GenerationClient::with_backend(
            ScriptedBackend::replying("ok"),
            selection("models/gemini-1.5-flash"),
        );
        let status = client.status();
        assert!(status.is_configured());
        assert_eq!(
            status.lines(),
            vec![
                "✅ API configured successfully".to_string(),
                "Using model: models/gemini-1.5-flash".to_string(),
            ]
        );
    }

    #[test]
    fn status_debug_lines_show_masked_key_only() {
        let mut key = KeyDiagnostics::default();
        key.record(&Credential::new(
            CredentialSource::Environment,
            "AIzaSyVerySecretValue",
        ));
        let status = ApiStatus {
            model: Err("Error listing models: boom".to_string()),
            discovered: vec!["models/gemini-pro".to_string()],
            key,
        };
        let report = status.lines().join("\n");
        assert!(report.contains("API key starts with: AIzaSy..."));
        assert!(report.contains("API key length: 21 characters"));
        assert!(report.contains("Found 1 available models, but couldn't initialize:"));
        assert!(!report.contains("VerySecret"));
    }
}
