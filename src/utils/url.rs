//! URL utilities for building Gemini REST endpoints
//!
//! Base URLs come from user configuration and may carry trailing slashes;
//! model identifiers may or may not include the `models/` resource prefix.

/// Default Gemini REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const MODEL_RESOURCE_PREFIX: &str = "models/";

/// Normalize a base URL by removing trailing slashes
///
/// # Examples
///
/// ```
/// use artrestorer::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://example.com/v1beta/"), "https://example.com/v1beta");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Return the full resource name for a model (`models/<id>`)
pub fn model_resource_name(model: &str) -> String {
    if model.starts_with(MODEL_RESOURCE_PREFIX) {
        model.to_string()
    } else {
        format!("{MODEL_RESOURCE_PREFIX}{model}")
    }
}

/// URL of the `generateContent` method for a model
///
/// # Examples
///
/// ```
/// use artrestorer::utils::url::generate_content_url;
///
/// assert_eq!(
///     generate_content_url("https://example.com/v1beta/", "gemini-pro"),
///     "https://example.com/v1beta/models/gemini-pro:generateContent"
/// );
/// ```
pub fn generate_content_url(base_url: &str, model: &str) -> String {
    construct_api_url(
        base_url,
        &format!("{}:generateContent", model_resource_name(model)),
    )
}
