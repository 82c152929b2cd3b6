//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for production runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Provisional category sent to the metadata optimizer.
    #[serde(default = "default_category")]
    pub default_category: String,

    /// Category used on upload when the record has none.
    #[serde(default = "default_upload_category")]
    pub upload_fallback_category: String,

    /// Length of the generated clip (seconds).
    #[serde(default = "default_clip_duration")]
    pub clip_duration_secs: u32,

    /// Aspect ratio of the generated clip.
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// How long an operation handle stays valid (hours).
    /// Jobs not finished within this window are considered lost.
    #[serde(default = "default_operation_ttl")]
    pub operation_ttl_hours: i64,
}

fn default_category() -> String {
    "Technology".to_string()
}

fn default_upload_category() -> String {
    "28".to_string() // Science & Technology
}

fn default_clip_duration() -> u32 {
    5
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

fn default_operation_ttl() -> i64 {
    crate::operation::DEFAULT_OPERATION_TTL_HOURS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            upload_fallback_category: default_upload_category(),
            clip_duration_secs: default_clip_duration(),
            aspect_ratio: default_aspect_ratio(),
            operation_ttl_hours: default_operation_ttl(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.default_category, "Technology");
        assert_eq!(config.upload_fallback_category, "28");
        assert_eq!(config.clip_duration_secs, 5);
        assert_eq!(config.aspect_ratio, "16:9");
        assert_eq!(config.operation_ttl_hours, 24);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            clip_duration_secs = 8
            aspect_ratio = "9:16"
        "#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.clip_duration_secs, 8);
        assert_eq!(config.aspect_ratio, "9:16");
        assert_eq!(config.default_category, "Technology");
    }
}
