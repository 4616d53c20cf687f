use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub azure_openai: AzureOpenAiSettings,
    pub qdrant: QdrantSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureOpenAiSettings {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_embedding_deployment")]
    pub embedding_deployment: String,
    #[serde(default = "default_chat_deployment")]
    pub chat_deployment: String,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
}

fn default_api_version() -> String { "2024-02-15-preview".to_string() }
fn default_embedding_deployment() -> String { "text-embedding-3-small".to_string() }
fn default_chat_deployment() -> String { "gpt-4o-mini".to_string() }
fn default_embedding_dimension() -> usize { 1536 }
fn default_max_completion_tokens() -> u32 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantSettings {
    #[serde(default = "default_qdrant_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_qdrant_url() -> String { "http://localhost:6333".to_string() }
fn default_collection() -> String { "nexo_members".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub embedding_cache_size: Option<u64>,
    pub embedding_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<u16>,
    pub max_limit: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,
    #[serde(default = "default_work_area_weight")]
    pub work_area: f64,
    #[serde(default = "default_sub_area_weight")]
    pub sub_area: f64,
    #[serde(default = "default_complementarity_weight")]
    pub complementarity: f64,
    #[serde(default = "default_size_match_weight")]
    pub size_match: f64,
    #[serde(default = "default_size_diversity_weight")]
    pub size_diversity: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            similarity: default_similarity_weight(),
            work_area: default_work_area_weight(),
            sub_area: default_sub_area_weight(),
            complementarity: default_complementarity_weight(),
            size_match: default_size_match_weight(),
            size_diversity: default_size_diversity_weight(),
        }
    }
}

fn default_similarity_weight() -> f64 { 0.40 }
fn default_work_area_weight() -> f64 { 0.10 }
fn default_sub_area_weight() -> f64 { 0.10 }
fn default_complementarity_weight() -> f64 { 0.30 }
fn default_size_match_weight() -> f64 { 0.10 }
fn default_size_diversity_weight() -> f64 { 0.05 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with NEXO__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            // Add default config file
            .add_source(File::with_name("config/default").required(false))
            // Add local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (prefixed with NEXO__)
            // e.g., NEXO__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NEXO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Substitute well-known environment variables into config values
        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NEXO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Substitute well-known environment variables into config values
///
/// Deployments usually inject credentials under their conventional names
/// (AZURE_OPENAI_API_KEY, QDRANT_URL, ...) rather than the NEXO__ prefix,
/// so those are honored here when present.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let azure_endpoint = env::var("AZURE_OPENAI_ENDPOINT").ok();
    let azure_api_key = env::var("AZURE_OPENAI_API_KEY").ok();
    let qdrant_url = env::var("QDRANT_URL").ok();
    let qdrant_api_key = env::var("QDRANT_API_KEY").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(endpoint) = azure_endpoint {
        builder = builder.set_override("azure_openai.endpoint", endpoint)?;
    }
    if let Some(api_key) = azure_api_key {
        builder = builder.set_override("azure_openai.api_key", api_key)?;
    }
    if let Some(url) = qdrant_url {
        builder = builder.set_override("qdrant.url", url)?;
    }
    if let Some(api_key) = qdrant_api_key {
        builder = builder.set_override("qdrant.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.similarity, 0.40);
        assert_eq!(weights.work_area, 0.10);
        assert_eq!(weights.sub_area, 0.10);
        assert_eq!(weights.complementarity, 0.30);
        assert_eq!(weights.size_match, 0.10);
        assert_eq!(weights.size_diversity, 0.05);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_azure_defaults() {
        assert_eq!(default_api_version(), "2024-02-15-preview");
        assert_eq!(default_embedding_deployment(), "text-embedding-3-small");
        assert_eq!(default_chat_deployment(), "gpt-4o-mini");
        assert_eq!(default_embedding_dimension(), 1536);
    }

    #[test]
    fn test_load_from_reads_a_settings_file() {
        let path = std::env::temp_dir().join("nexo_algo_settings_test.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9090

[azure_openai]
endpoint = "https://example.openai.azure.com"
api_key = "test-key"

[qdrant]

[cache]

[matching]
default_limit = 5

[scoring]

[logging]
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.matching.default_limit, Some(5));
        // Omitted keys fall back to the field defaults
        assert_eq!(settings.qdrant.collection, "nexo_members");
        assert_eq!(settings.azure_openai.embedding_dimension, 1536);
        assert_eq!(settings.scoring.weights.complementarity, 0.30);
        assert_eq!(settings.logging.level, "info");
    }
}
