//! HTTP client for the decision and telemetry service
//!
//! The frame callback is synchronous, so every call is driven to completion on
//! a private current-thread runtime. Connect and total timeouts bound how long
//! one call can hold the frame.

use crate::core::config::ServiceConfig;
use crate::core::error::{AgentError, Result};
use crate::service::spaces::{ActionSpaceConfig, ObservationSpaceConfig};
use crate::service::wire::{ModelSelection, PredictRequest, PredictResponse, RewardBatch};
use reqwest::Client;
use serde::Serialize;
use tokio::runtime::{Builder, Runtime};

/// Source of actions and of the spaces the policy was trained on
pub trait DecisionService {
    fn predict(&self, model: &str, request: &PredictRequest<'_>) -> Result<PredictResponse>;

    fn action_space(&self) -> Result<ActionSpaceConfig>;

    fn observation_space(&self) -> Result<ObservationSpaceConfig>;

    fn model(&self) -> Result<ModelSelection>;
}

/// Destination of reward events
pub trait TelemetrySink {
    fn add_reward(&self, batch: &RewardBatch<'_>) -> Result<()>;
}

/// Blocking HTTP implementation of both service traits
pub struct HttpService {
    client: Client,
    base_url: String,
    runtime: Runtime,
}

impl HttpService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_body(path: &str, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::RemoteStatus {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_async(&self, path: &str) -> Result<String> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::read_body(path, response).await
    }

    async fn post_json_async<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;
        Self::read_body(path, response).await
    }

    /// GET `path`, returning the body of a 2xx response
    pub fn get(&self, path: &str) -> Result<String> {
        tracing::trace!(path, "GET");
        self.runtime.block_on(self.get_async(path))
    }

    /// POST `body` as JSON to `path`, returning the body of a 2xx response
    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String> {
        tracing::trace!(path, "POST");
        self.runtime.block_on(self.post_json_async(path, body))
    }
}

impl DecisionService for HttpService {
    fn predict(&self, model: &str, request: &PredictRequest<'_>) -> Result<PredictResponse> {
        let body = self.post_json(&format!("/predict-action/{}", model), request)?;
        PredictResponse::parse(&body)
    }

    fn action_space(&self) -> Result<ActionSpaceConfig> {
        ActionSpaceConfig::parse(&self.get("/set-action-space")?)
    }

    fn observation_space(&self) -> Result<ObservationSpaceConfig> {
        ObservationSpaceConfig::parse(&self.get("/set-observation-space")?)
    }

    fn model(&self) -> Result<ModelSelection> {
        Ok(serde_json::from_str(&self.get("/set-model")?)?)
    }
}

impl TelemetrySink for HttpService {
    fn add_reward(&self, batch: &RewardBatch<'_>) -> Result<()> {
        self.post_json("/add-reward/", batch).map(|_| ())
    }
}
