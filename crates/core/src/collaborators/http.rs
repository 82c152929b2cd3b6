//! JSON-over-HTTP collaborator backend.
//!
//! Every contract maps to one `POST {base_url}/{endpoint}` call carrying the
//! request type as JSON. What sits behind the gateway (which model, which
//! video platform) is outside this crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CollaboratorsConfig;
use crate::metrics::{EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS};

use super::traits::{
    CollaboratorError, GenerationKickoff, MetadataOptimizer, OperationStatusCheck,
    ScriptGenerator, SeriesStrategist, SpeechSynthesizer, ThumbnailGenerator, Uploader,
};
use super::types::{
    GeneratedScript, KickoffRequest, OperationStatus, OptimizationRequest, OptimizedMetadata,
    ScriptRequest, SeriesSuggestion, ThumbnailRequest, UploadRequest,
};

const SERVICE: &str = "gateway";

#[derive(Serialize)]
struct StatusBody<'a> {
    operation: &'a str,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    script: &'a str,
}

#[derive(Serialize)]
struct SeriesBody<'a> {
    existing_playlists: &'a [String],
}

#[derive(Deserialize)]
struct KickoffResponse {
    #[serde(default)]
    operation: Option<String>,
}

#[derive(Deserialize)]
struct SpeechResponse {
    audio_url: String,
}

#[derive(Deserialize)]
struct ThumbnailResponse {
    thumbnail_url: String,
}

/// Collaborator backend talking to a JSON gateway.
pub struct HttpCollaborators {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCollaborators {
    pub fn new(config: &CollaboratorsConfig) -> Result<Self, CollaboratorError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CollaboratorError::NotConfigured("collaborators.base_url".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Request(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, CollaboratorError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        let result = self.send(endpoint, body).await;

        EXTERNAL_SERVICE_DURATION
            .with_label_values(&[SERVICE, endpoint])
            .observe(start.elapsed().as_secs_f64());
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[SERVICE, endpoint, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    async fn send<B, R>(&self, endpoint: &str, body: &B) -> Result<R, CollaboratorError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(endpoint = endpoint, "Calling collaborator gateway");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CollaboratorError::Request(format!("{} timed out", endpoint))
            } else {
                CollaboratorError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(format!("{}: {}", endpoint, e)))
    }
}

#[async_trait]
impl ScriptGenerator for HttpCollaborators {
    async fn generate_script(
        &self,
        request: &ScriptRequest,
    ) -> Result<GeneratedScript, CollaboratorError> {
        self.post("script", request).await
    }
}

#[async_trait]
impl MetadataOptimizer for HttpCollaborators {
    async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizedMetadata, CollaboratorError> {
        self.post("optimize", request).await
    }
}

#[async_trait]
impl GenerationKickoff for HttpCollaborators {
    async fn kickoff(&self, request: &KickoffRequest) -> Result<Option<String>, CollaboratorError> {
        let response: KickoffResponse = self.post("generate", request).await?;
        Ok(response.operation.filter(|op| !op.is_empty()))
    }
}

#[async_trait]
impl OperationStatusCheck for HttpCollaborators {
    async fn check(&self, reference: &str) -> Result<OperationStatus, CollaboratorError> {
        self.post("operations/status", &StatusBody { operation: reference })
            .await
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpCollaborators {
    async fn synthesize(&self, script: &str) -> Result<String, CollaboratorError> {
        let response: SpeechResponse = self.post("speech", &SpeechBody { script }).await?;
        Ok(response.audio_url)
    }
}

#[async_trait]
impl ThumbnailGenerator for HttpCollaborators {
    async fn generate_thumbnail(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<String, CollaboratorError> {
        let response: ThumbnailResponse = self.post("thumbnail", request).await?;
        if response.thumbnail_url.is_empty() {
            return Err(CollaboratorError::InvalidResponse(
                "thumbnail: empty image reference".to_string(),
            ));
        }
        Ok(response.thumbnail_url)
    }
}

#[async_trait]
impl SeriesStrategist for HttpCollaborators {
    async fn suggest_series(
        &self,
        existing_playlists: &[String],
    ) -> Result<SeriesSuggestion, CollaboratorError> {
        self.post("series", &SeriesBody { existing_playlists }).await
    }
}

#[async_trait]
impl Uploader for HttpCollaborators {
    async fn upload(&self, request: &UploadRequest) -> Result<(), CollaboratorError> {
        let _: serde_json::Value = self.post("upload", request).await?;
        Ok(())
    }
}
