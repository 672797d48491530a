//! HTTP implementation of [`PreingestApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{PreingestError, Result};

use super::types::{
    ActionResult, Collection, ExecutionPlan, ServerFile, Settings, TriggerActionResult,
};
use super::PreingestApi;

/// A response body, if the server sent one.
#[derive(Debug)]
enum Body {
    Json(serde_json::Value),
    Text(String),
}

/// Talks to the pre-ingest API over HTTP.
///
/// # Example
///
/// ```no_run
/// use preingest::api::{HttpApiClient, PreingestApi};
/// use std::time::Duration;
///
/// # async fn demo() -> preingest::Result<()> {
/// let api = HttpApiClient::new("http://localhost:8000/api/", Duration::from_secs(30))?;
/// let collection = api.get_collection("b56f1128").await?;
/// println!("{} actions", collection.preingest.len());
/// # Ok(())
/// # }
/// ```
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpApiClient {
    /// Create a client for the given base URL, like `http://host/api/`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = Client::builder()
            .user_agent("preingest")
            .timeout(timeout)
            .build()
            .map_err(|e| PreingestError::Connection {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Get the configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the base URL, always ending in a slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Option<Body>> {
        debug!(path, "pre-ingest request");
        let response = request.send().await.map_err(|e| PreingestError::Connection {
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PreingestError::Http {
                status: status.as_u16(),
                path: path.to_string(),
                detail,
            });
        }

        // The API may answer 200 OK with an empty body rather than 204
        let empty = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");
        if empty || status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        // May include a charset, like `application/json; charset=utf-8`
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().contains("json"));

        let text = response.text().await.map_err(|e| PreingestError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        if is_json {
            let value = serde_json::from_str(&text).map_err(|e| PreingestError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            })?;
            Ok(Some(Body::Json(value)))
        } else {
            Ok(Some(Body::Text(text)))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = self.send(path, self.request(Method::GET, path)).await?;
        decode(path, body)
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let request = self.request(method, path).json(body);
        let body = self.send(path, request).await?;
        decode(path, body)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send(path, self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: Option<Body>) -> Result<Option<T>> {
    match body {
        None => Ok(None),
        Some(Body::Json(value)) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| PreingestError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            }),
        Some(Body::Text(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| PreingestError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            }),
    }
}

#[async_trait]
impl PreingestApi for HttpApiClient {
    async fn get_collections(&self) -> Result<Vec<Collection>> {
        Ok(self
            .get_json::<Vec<Collection>>("output/collections")
            .await?
            .unwrap_or_default())
    }

    async fn get_collection(&self, session_id: &str) -> Result<Collection> {
        let path = format!("output/collection/{}", session_id);
        self.get_json::<Collection>(&path)
            .await?
            .ok_or_else(|| PreingestError::NoSuchSession {
                session_id: session_id.to_string(),
            })
    }

    async fn submit_execution_plan(
        &self,
        session_id: &str,
        plan: &ExecutionPlan,
    ) -> Result<Option<TriggerActionResult>> {
        let path = format!("Service/startplan/{}", session_id);
        self.send_json(Method::POST, &path, plan).await
    }

    async fn cancel_execution_plan(&self, session_id: &str) -> Result<()> {
        self.delete(&format!("Service/cancelplan/{}", session_id))
            .await
    }

    async fn get_action_result(
        &self,
        session_id: &str,
        result_file: &str,
    ) -> Result<ActionResult> {
        if result_file.to_ascii_lowercase().ends_with(".json") {
            let path = format!("output/json/{}/{}", session_id, result_file);
            let detail = self.get_json(&path).await?.unwrap_or_default();
            return Ok(ActionResult::Json(detail));
        }

        let path = format!("output/report/{}/{}", session_id, result_file);
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(ACCEPT, "*/*");
        match self.send(&path, request).await? {
            None => Ok(ActionResult::Text(String::new())),
            Some(Body::Text(text)) => Ok(ActionResult::Text(text)),
            Some(Body::Json(value)) => Ok(ActionResult::Text(value.to_string())),
        }
    }

    fn action_report_url(&self, session_id: &str, file: &str) -> String {
        format!("{}output/report/{}/{}", self.base_url, session_id, file)
    }

    async fn save_settings(&self, session_id: &str, settings: &Settings) -> Result<()> {
        let path = format!("preingest/settings/{}", session_id);
        self.send_json::<_, serde_json::Value>(Method::PUT, &path, settings)
            .await?;
        Ok(())
    }

    async fn reset_session(&self, session_id: &str) -> Result<()> {
        self.delete(&format!("Status/reset/{}", session_id)).await
    }

    async fn remove_session(&self, session_id: &str) -> Result<()> {
        self.delete(&format!("Status/remove/{}", session_id)).await
    }

    async fn list_stylesheets(&self) -> Result<Vec<ServerFile>> {
        Ok(self
            .get_json("output/stylesheets")
            .await?
            .unwrap_or_default())
    }

    async fn list_schemas(&self) -> Result<Vec<ServerFile>> {
        Ok(self.get_json("output/schemas").await?.unwrap_or_default())
    }
}
