use crate::api::{ApiError, ModelInfo, ModelsResponse};
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;
use std::fmt;
use std::time::Duration;
use tracing::debug;

const PAGE_SIZE: u32 = 100;
/// Guards against a server that keeps handing out page tokens.
const MAX_PAGES: usize = 20;

/// A listing that failed part-way, keeping whatever pages did arrive.
#[derive(Debug)]
pub struct ListingFailure {
    pub partial: Vec<ModelInfo>,
    pub error: ApiError,
}

impl fmt::Display for ListingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ListingFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Vec<ModelInfo>, ListingFailure> {
    let models_url = construct_api_url(base_url, "models");
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    for page in 0..MAX_PAGES {
        let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
        if let Some(token) = &page_token {
            query.push(("pageToken", token.clone()));
        }
        let request = add_auth_headers(client.get(&models_url), api_key).query(&query);

        let page_result = fetch_page(request, timeout).await;
        let response = match page_result {
            Ok(response) => response,
            Err(error) => {
                return Err(ListingFailure {
                    partial: models,
                    error,
                })
            }
        };

        debug!(page, count = response.models.len(), "Fetched model page");
        models.extend(response.models);

        match response.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => page_token = Some(token),
            None => return Ok(models),
        }
    }

    debug!(max_pages = MAX_PAGES, "Stopped following model page tokens");
    Ok(models)
}

async fn fetch_page(
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> Result<ModelsResponse, ApiError> {
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

    response
        .json::<ModelsResponse>()
        .await
        .map_err(|err| ApiError::from_reqwest(err, timeout))
}

/// Keep only models that can answer `generateContent`, preserving order.
pub fn text_generation_models(models: Vec<ModelInfo>) -> Vec<ModelInfo> {
    models
        .into_iter()
        .filter(ModelInfo::supports_generate_content)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::auth::API_KEY_HEADER;
    use crate::utils::test_utils::serve_responses;

    fn model(name: &str, methods: &[&str]) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            display_name: None,
            description: None,
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
            input_token_limit: None,
            output_token_limit: None,
        }
    }

    #[test]
    fn filter_keeps_generate_content_models_in_order() {
        let models = vec![
            model("models/embedding-001", &["embedContent"]),
            model("models/gemini-pro", &["generateContent", "countTokens"]),
            model("models/aqa", &["generateAnswer"]),
            model("models/gemini-1.5-flash", &["generateContent"]),
        ];

        let names: Vec<String> = text_generation_models(models)
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["models/gemini-pro", "models/gemini-1.5-flash"]);
    }

    #[test]
    fn listing_failure_displays_underlying_error() {
        let failure = ListingFailure {
            partial: vec![model("models/gemini-pro", &["generateContent"])],
            error: ApiError::Timeout(Duration::from_secs(30)),
        };
        assert_eq!(failure.to_string(), "request timed out after 30s");
    }

    fn page(names: &[&str], next_page_token: Option<&str>) -> String {
        let models: Vec<serde_json::Value> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "supportedGenerationMethods": ["generateContent"]
                })
            })
            .collect();
        let mut body = serde_json::json!({ "models": models });
        if let Some(token) = next_page_token {
            body["nextPageToken"] = serde_json::json!(token);
        }
        body.to_string()
    }

    #[tokio::test]
    async fn listing_follows_page_tokens_with_key_header() {
        let (base_url, server) = serve_responses(vec![
            (200, page(&["models/a"], Some("T2"))),
            (200, page(&["models/b", "models/c"], None)),
        ])
        .await;

        let models = fetch_models(
            &reqwest::Client::new(),
            &base_url,
            "test-key",
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["models/a", "models/b", "models/c"]);
        assert!(models.iter().all(ModelInfo::supports_generate_content));

        let requests = server.await.unwrap().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0].request_line,
            "GET /v1beta/models?pageSize=100 HTTP/1.1"
        );
        assert_eq!(
            requests[1].request_line,
            "GET /v1beta/models?pageSize=100&pageToken=T2 HTTP/1.1"
        );
        for request in &requests {
            assert_eq!(request.header(API_KEY_HEADER), Some("test-key"));
            assert!(!request.request_line.contains("key="));
        }
    }

    #[tokio::test]
    async fn failed_later_page_keeps_earlier_models() {
        let (base_url, server) = serve_responses(vec![
            (200, page(&["models/a"], Some("T2"))),
            (200, page(&["models/b"], Some("T3"))),
            (
                500,
                r#"{"error": {"code": 500, "message": "boom", "status": "INTERNAL"}}"#.to_string(),
            ),
        ])
        .await;

        let failure = fetch_models(
            &reqwest::Client::new(),
            &base_url,
            "test-key",
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        let partial: Vec<&str> = failure.partial.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(partial, vec!["models/a", "models/b"]);
        assert!(matches!(failure.error, ApiError::Status { status: 500, .. }));
        assert_eq!(
            failure.to_string(),
            "API request failed with status 500: INTERNAL: boom"
        );

        let requests = server.await.unwrap().unwrap();
        assert_eq!(
            requests[2].request_line,
            "GET /v1beta/models?pageSize=100&pageToken=T3 HTTP/1.1"
        );
    }
}
