use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::pipeline::PipelineConfig;
use crate::poller::PollerConfig;
use crate::scheduler::AutopilotConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub autopilot: AutopilotConfig,
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,
    #[serde(default)]
    pub uploader: Option<UploaderConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Collaborator backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollaboratorsConfig {
    /// Backend type
    #[serde(default)]
    pub backend: CollaboratorBackend,
    /// Gateway URL (e.g., "http://localhost:9400"), required for the http backend
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token sent to the gateway
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            backend: CollaboratorBackend::default(),
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}

/// Available collaborator backends
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorBackend {
    /// JSON-over-HTTP gateway
    #[default]
    Http,
}

/// Upload target credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploaderConfig {
    pub api_key: String,
    pub channel_id: String,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub poller: PollerConfig,
    pub autopilot: AutopilotConfig,
    pub collaborators: SanitizedCollaboratorsConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<SanitizedUploaderConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCollaboratorsConfig {
    pub backend: CollaboratorBackend,
    pub base_url: Option<String>,
    pub api_key: Option<&'static str>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedUploaderConfig {
    pub api_key: &'static str,
    pub channel_id: String,
}

const REDACTED: &str = "[REDACTED]";

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            pipeline: config.pipeline.clone(),
            poller: config.poller.clone(),
            autopilot: config.autopilot.clone(),
            collaborators: SanitizedCollaboratorsConfig {
                backend: config.collaborators.backend.clone(),
                base_url: config.collaborators.base_url.clone(),
                api_key: config.collaborators.api_key.as_ref().map(|_| REDACTED),
                timeout_secs: config.collaborators.timeout_secs,
            },
            uploader: config.uploader.as_ref().map(|u| SanitizedUploaderConfig {
                api_key: REDACTED,
                channel_id: u.channel_id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let config = Config {
            collaborators: CollaboratorsConfig {
                api_key: Some("gateway-secret".to_string()),
                ..Default::default()
            },
            uploader: Some(UploaderConfig {
                api_key: "yt-secret".to_string(),
                channel_id: "UC123".to_string(),
            }),
            ..Default::default()
        };

        let json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap();
        assert!(!json.contains("gateway-secret"));
        assert!(!json.contains("yt-secret"));
        assert!(json.contains("UC123"));
        assert!(json.contains(REDACTED));
    }
}
