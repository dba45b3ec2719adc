use crate::api::{ApiError, GenerateContentRequest, GenerateContentResponse};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::generate_content_url;
use std::time::Duration;
use tracing::debug;

pub async fn generate_content(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    timeout: Duration,
) -> Result<String, ApiError> {
    let url = generate_content_url(base_url, model);
    let request = add_auth_headers(client.post(url), api_key)
        .json(&GenerateContentRequest::from_prompt(prompt));

    let response = request
        .send()
        .await
        .map_err(|err| ApiError::from_reqwest(err, timeout))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::from_status(status, &error_text));
    }

    let body = response
        .json::<GenerateContentResponse>()
        .await
        .map_err(|err| ApiError::from_reqwest(err, timeout))?;
    let text = response_text(body)?;
    debug!(model, chars = text.chars().count(), "Received generated text");
    Ok(text)
}

/// Concatenate the text parts of the first candidate.
pub fn response_text(response: GenerateContentResponse) -> Result<String, ApiError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(ApiError::EmptyResponse {
            reason: block_reason,
        });
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ApiError::EmptyResponse {
            reason: candidate.finish_reason.or(block_reason),
        });
    }
    Ok(text)
}
