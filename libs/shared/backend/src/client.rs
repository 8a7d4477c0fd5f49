use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::auth::Credential;

use crate::error::BackendError;

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_headers(&self, credential: Option<&Credential>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(credential) = credential {
            let value = HeaderValue::from_str(&format!("Bearer {}", credential.token()))
                .map_err(|_| {
                    BackendError::InvalidCredential("token contains invalid header characters".to_string())
                })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        body: Option<Value>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(credential)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        Self::handle_response(response).await
    }

    /// Sends an `application/x-www-form-urlencoded` POST, as the token endpoint expects.
    pub async fn post_form<T>(
        &self,
        path: &str,
        credential: Option<&Credential>,
        form: &[(&str, &str)],
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making form POST request to {}", url);

        let headers = self.get_headers(credential)?;
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .form(form)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T>(response: Response) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, body);
            let detail = extract_detail(&body);

            return Err(match status.as_u16() {
                401 | 403 => BackendError::Unauthorized {
                    status: status.as_u16(),
                    detail,
                },
                404 => BackendError::NotFound(detail),
                code => BackendError::Api { status: code, detail },
            });
        }

        // Some endpoints answer 2xx with an empty body.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str::<T>(body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Pulls the human-readable message out of an error body.
///
/// The backend uses `detail` (a string, or a list of `{msg}` objects for
/// validation failures); some endpoints use `message` or `error` instead.
/// Non-JSON bodies are returned trimmed.
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(Value::String(msg)) => return msg.clone(),
            Some(Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            Some(Value::Object(inner)) => {
                if let Some(Value::String(msg)) = inner.get("message") {
                    return msg.clone();
                }
            }
            _ => {}
        }
    }

    String::new()
}
