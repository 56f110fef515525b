use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    #[validate(nested)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub schema: SchemaSettings,
    #[serde(default)]
    #[validate(nested)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    /// Deadline for one matching run, embedding calls and solver included
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            run_timeout_secs: default_run_timeout(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_run_timeout() -> u64 { 120 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MatchingSettings {
    /// Upper bound on partners per participant
    #[validate(range(min = 1, max = 16))]
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Fixed seed for capacity distribution and slot designation
    pub seed: Option<u64>,
    /// Collapse repeated mentor/mentee pairs in the projected result
    #[serde(default)]
    pub deduplicate_pairs: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            seed: None,
            deduplicate_pairs: false,
        }
    }
}

fn default_max_connections() -> usize { 2 }

/// One survey column as written in configuration
///
/// `kind` stays a plain string here; it is resolved (and rejected when
/// unknown) by [`crate::core::AttributeSchema::from_settings`].
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeConfig {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub weight: Option<u32>,
    /// `overlap`, `pronoun` or `identity_group` for multiple-choice columns
    #[serde(default)]
    pub rule: Option<String>,
    /// Reference pronoun for the `pronoun` rule
    #[serde(default)]
    pub reference: Option<String>,
}

impl AttributeConfig {
    fn new(name: &str, kind: &str, weight: Option<u32>) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            weight,
            rule: None,
            reference: None,
        }
    }

    fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSettings {
    #[serde(default = "default_attributes")]
    pub attributes: Vec<AttributeConfig>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            attributes: default_attributes(),
        }
    }
}

/// The survey used by the mentoring program
pub fn default_attributes() -> Vec<AttributeConfig> {
    vec![
        AttributeConfig::new("id", "uuid", None),
        AttributeConfig::new("role", "role", None),
        AttributeConfig::new("course", "binary", Some(3)),
        AttributeConfig::new("pronouns", "multiple_choice", Some(8)).with_rule("pronoun"),
        AttributeConfig::new("ethnicity", "multiple_choice", Some(4)),
        AttributeConfig::new("city", "embedding", Some(1)),
        AttributeConfig::new("lgbt", "multiple_choice", Some(3)).with_rule("identity_group"),
        AttributeConfig::new("parties", "numeric", Some(2)),
        AttributeConfig::new("hobby", "embedding", Some(2)),
        AttributeConfig::new("music", "embedding", Some(1)),
        AttributeConfig::new("games", "embedding", Some(1)),
        AttributeConfig::new("sports", "embedding", Some(2)),
    ]
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmbeddingSettings {
    /// `http`, `hashing` or `none`
    #[serde(default = "default_provider")]
    pub provider: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[validate(range(min = 1))]
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_embedding_timeout(),
        }
    }
}

fn default_provider() -> String { "hashing".to_string() }
fn default_model() -> String { "all-mpnet-base-v2".to_string() }
fn default_dimensions() -> usize { 384 }
fn default_embedding_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// HS256 secret; the matching endpoint is open when unset
    pub jwt_secret: Option<String>,
    #[serde(default = "default_required_role")]
    pub required_role: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            required_role: default_required_role(),
        }
    }
}

fn default_required_role() -> String { "ADMIN".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MENTOR_MATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MENTOR_MATCH__MATCHING__MAX_CONNECTIONS -> matching.max_connections
            .add_source(
                Environment::with_prefix("MENTOR_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MENTOR_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Pick up well-known secrets that are usually exported without the prefix
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let jwt_secret = env::var("JWT_SECRET").ok();
    let embedding_api_key = env::var("EMBEDDING_API_KEY").ok();
    let embedding_endpoint = env::var("EMBEDDING_ENDPOINT").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(secret) = jwt_secret {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Some(api_key) = embedding_api_key {
        builder = builder.set_override("embedding.api_key", api_key)?;
    }
    if let Some(endpoint) = embedding_endpoint {
        builder = builder.set_override("embedding.endpoint", endpoint)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_weights() {
        let attributes = default_attributes();
        let total: u32 = attributes.iter().filter_map(|a| a.weight).sum();
        assert_eq!(total, 27);
        assert_eq!(attributes[3].name, "pronouns");
        assert_eq!(attributes[3].rule.as_deref(), Some("pronoun"));
        assert_eq!(attributes[6].rule.as_deref(), Some("identity_group"));
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [matching]
            max_connections = 3
            seed = 7

            [[schema.attributes]]
            name = "course"
            kind = "binary"
            weight = 1
            "#,
        )
        .unwrap();

        assert_eq!(settings.matching.max_connections, 3);
        assert_eq!(settings.matching.seed, Some(7));
        assert!(!settings.matching.deduplicate_pairs);
        assert_eq!(settings.schema.attributes.len(), 1);
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.embedding.provider, "hashing");
        assert_eq!(settings.auth.required_role, "ADMIN");
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut settings = Settings::default();
        settings.matching.max_connections = 0;
        assert!(settings.validate().is_err());
    }
}
