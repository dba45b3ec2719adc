//! Remote model discovery and selection.

use crate::api::models::{text_generation_models, ListingFailure};
use crate::api::ModelInfo;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::{info, warn};

/// Preferred models, best first. The first one the provider offers wins.
pub const PREFERRED_MODELS: [&str; 4] = [
    "models/gemini-1.5-flash",
    "models/gemini-1.5-pro",
    "models/gemini-pro",
    "models/gemini-1.0-pro",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub name: String,
    pub display_name: Option<String>,
    pub supports_text_generation: bool,
}

impl From<ModelInfo> for ModelDescriptor {
    fn from(info: ModelInfo) -> Self {
        let supports_text_generation = info.supports_generate_content();
        Self {
            name: info.name,
            display_name: info.display_name,
            supports_text_generation,
        }
    }
}

/// Source of the provider's model list.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ListingFailure>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// There was no key to list models with.
    MissingCredential(String),
    /// The client could not be built or the listing call failed.
    Listing {
        message: String,
        /// Usable models seen before the failure.
        discovered: Vec<String>,
    },
    /// The provider offered no model that can generate text.
    NoUsableModel,
}

impl SelectionError {
    /// Model names that were discovered before selection failed.
    pub fn discovered(&self) -> &[String] {
        match self {
            SelectionError::Listing { discovered, .. } => discovered,
            SelectionError::MissingCredential(_) | SelectionError::NoUsableModel => &[],
        }
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::MissingCredential(reason) => f.write_str(reason),
            SelectionError::Listing { message, .. } => write!(f, "Error listing models: {message}"),
            SelectionError::NoUsableModel => f.write_str(
                "No usable model found: no models supporting generateContent \
                 are available for your API key",
            ),
        }
    }
}

impl Error for SelectionError {}

/// The chosen model together with everything that was on offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub chosen: ModelDescriptor,
    pub discovered: Vec<ModelDescriptor>,
}

/// Pick the first preferred model present in `discovered`, else the first
/// discovered model in provider order.
pub fn choose_model(discovered: &[ModelDescriptor]) -> Option<&ModelDescriptor> {
    PREFERRED_MODELS
        .iter()
        .find_map(|preferred| discovered.iter().find(|model| model.name == *preferred))
        .or_else(|| discovered.first())
}

pub async fn select_model(catalog: &dyn ModelCatalog) -> Result<ModelSelection, SelectionError> {
    let models = catalog.list_models().await.map_err(|failure| {
        let discovered: Vec<String> = text_generation_models(failure.partial)
            .into_iter()
            .map(|model| model.name)
            .collect();
        warn!(error = %failure.error, partial = discovered.len(), "Model listing failed");
        SelectionError::Listing {
            message: failure.error.to_string(),
            discovered,
        }
    })?;

    let discovered: Vec<ModelDescriptor> = text_generation_models(models)
        .into_iter()
        .map(ModelDescriptor::from)
        .collect();

    let chosen = choose_model(&discovered)
        .cloned()
        .ok_or(SelectionError::NoUsableModel)?;
    info!(
        model = %chosen.name,
        discovered = discovered.len(),
        "Selected model"
    );

    Ok(ModelSelection { chosen, discovered })
}
