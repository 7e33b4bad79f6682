//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use recipe_core::config::ClientConfig;
use recipe_core::error::{RecipeError, Result};
use recipe_core::transport::{Transport, UploadFile};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// JSON-over-HTTP access to the recipe API.
///
/// Non-success responses become [`RecipeError::Transport`] carrying the
/// status code and the server's `detail`/`message` text when the body has
/// one.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecipeError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Value> {
        tracing::debug!("[HttpTransport] {} {}", method, path);
        let response = request.send().await.map_err(request_error)?;
        let status = response.status();
        let body = response.text().await.map_err(request_error)?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!("[HttpTransport] {} {} failed: {} {}", method, path, status, message);
            return Err(RecipeError::http(status.as_u16(), message));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let request = self.client.get(self.url(path)).query(params);
        self.send("GET", path, request).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let request = self.client.post(self.url(path)).json(&body);
        self.send("POST", path, request).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value> {
        let request = self.client.put(self.url(path)).json(&body);
        self.send("PUT", path, request).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.url(path));
        self.send("DELETE", path, request).await.map(|_| ())
    }

    async fn upload(&self, path: &str, file: UploadFile) -> Result<Value> {
        let content_type = file.content_type();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(content_type)
            .map_err(|e| RecipeError::internal(format!("Invalid content type: {}", e)))?;
        let request = self
            .client
            .post(self.url(path))
            .multipart(Form::new().part("file", part));
        self.send("POST", path, request).await
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

fn request_error(e: reqwest::Error) -> RecipeError {
    if e.is_timeout() {
        RecipeError::transport("Request timed out")
    } else if e.is_connect() {
        RecipeError::transport(format!("Could not reach the server: {}", e))
    } else {
        RecipeError::transport(e.to_string())
    }
}

/// Human-readable message for a failed response.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| message_from_body(&value))
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => format!("HTTP {}", status.as_u16()),
        })
}

fn message_from_body(value: &Value) -> Option<String> {
    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(Value::String(text)) if !text.is_empty() => return Some(text.clone()),
            // Field-level validation errors: [{"loc": [...], "msg": "..."}]
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_handles_slashes() {
        assert_eq!(
            join_url("http://localhost:8000/api", "/recipes/1"),
            "http://localhost:8000/api/recipes/1"
        );
        assert_eq!(join_url("http://h/api", "recipes"), "http://h/api/recipes");
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_base() {
        let transport = HttpTransport::new("http://h/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.base_url(), "http://h/api");
        assert_eq!(transport.url("/recipes"), "http://h/api/recipes");
    }

    #[test]
    fn test_error_message_prefers_detail() {
        let message = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Creation failed"}"#,
        );
        assert_eq!(message, "Creation failed");
    }

    #[test]
    fn test_error_message_joins_field_errors() {
        let body = r#"{"detail": [{"loc": ["body","title"], "msg": "field required"},
                                  {"loc": ["body","servings"], "msg": "must be positive"}]}"#;
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, body),
            "field required; must be positive"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>oops</html>"),
            "Service Unavailable"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }
}
