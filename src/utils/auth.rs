//! Authentication utilities for API requests
//!
//! Helpers for attaching the Gemini API key to outgoing requests and for
//! showing keys in diagnostics without leaking them.

/// Header the Gemini REST API reads the key from.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Number of leading characters of a key that diagnostics may reveal.
const VISIBLE_KEY_PREFIX: usize = 6;

/// Add the Gemini authentication header to an HTTP request
///
/// The key goes into a header rather than the `key=` query parameter so it
/// never shows up in URLs that end up in logs or error messages.
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    api_key: &str,
) -> reqwest::RequestBuilder {
    request.header(API_KEY_HEADER, api_key)
}

/// Mask an API key for display, keeping only a short prefix
///
/// # Examples
///
/// ```
/// use artrestorer::utils::auth::mask_key;
///
/// assert_eq!(mask_key("AIzaSyExample123"), "AIzaSy...");
/// assert_eq!(mask_key("abc"), "abc...");
/// ```
pub fn mask_key(api_key: &str) -> String {
    let prefix: String = api_key.chars().take(VISIBLE_KEY_PREFIX).collect();
    format!("{prefix}...")
}
