use std::time::Duration;

use wikisearch_core::embedding::DEFAULT_EMBEDDING_DIMENSION;
use wikisearch_core::search::{
    RankWeights, SearchSettings, DEFAULT_LEXICAL_WEIGHT, DEFAULT_OVERSAMPLE_FACTOR,
    DEFAULT_SEMANTIC_WEIGHT,
};
use wikisearch_semantic::qdrant::DEFAULT_QDRANT_COLLECTION;
use wikisearch_semantic::yandex::DEFAULT_YANDEX_EMBEDDING_URL;

use crate::auth::jwt::JwtConfig;

/// Which embedding provider to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Yandex Cloud text-search embeddings.
    Yandex,
    /// Local deterministic feature hashing. No network, weaker semantics.
    Hashing,
    /// No embeddings at all; search runs lexical-only.
    Disabled,
}

impl ProviderKind {
    /// Resolve `EMBEDDING_PROVIDER`. When unset, Yandex is used if its
    /// credentials are configured and hashing otherwise.
    pub fn resolve(value: Option<&str>, has_yandex_credentials: bool) -> Result<Self, String> {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            None | Some("") => Ok(if has_yandex_credentials {
                Self::Yandex
            } else {
                Self::Hashing
            }),
            Some("yandex") if has_yandex_credentials => Ok(Self::Yandex),
            Some("yandex") => Err(
                "EMBEDDING_PROVIDER=yandex requires YANDEX_OAUTH_TOKEN and YANDEX_FOLDER_ID"
                    .into(),
            ),
            Some("hashing") => Ok(Self::Hashing),
            Some("disabled") => Ok(Self::Disabled),
            Some(other) => Err(format!(
                "Unknown EMBEDDING_PROVIDER '{other}'. Valid values: yandex, hashing, disabled"
            )),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub yandex_token: Option<String>,
    pub yandex_folder_id: Option<String>,
    pub yandex_url: String,
    pub dimension: usize,
}

/// Vector index settings. Without a URL the in-memory index is used.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: Option<String>,
    pub collection: String,
    pub api_key: Option<String>,
}

/// Account created at startup when it does not exist yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub embedding: EmbeddingConfig,
    pub qdrant: QdrantConfig,
    /// Deadline for every embedding or vector index call.
    pub semantic_timeout: Duration,
    pub search: SearchSettings,
    pub reconcile_interval: Duration,
    pub reconcile_batch_size: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                          |
    /// |-----------------------------|----------------------------------|
    /// | `HOST`                      | `0.0.0.0`                        |
    /// | `PORT`                      | `3000`                           |
    /// | `CORS_ORIGINS`              | `http://localhost:8501`          |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                             |
    /// | `EMBEDDING_PROVIDER`        | `yandex` with credentials, else `hashing` |
    /// | `YANDEX_OAUTH_TOKEN`        | --                               |
    /// | `YANDEX_FOLDER_ID`          | --                               |
    /// | `YANDEX_EMBEDDING_URL`      | Yandex Cloud endpoint            |
    /// | `EMBEDDING_DIMENSION`       | `256`                            |
    /// | `QDRANT_URL`                | unset (in-memory); gRPC :6334    |
    /// | `QDRANT_COLLECTION`         | `articles`                       |
    /// | `QDRANT_API_KEY`            | --                               |
    /// | `SEMANTIC_TIMEOUT_MS`       | `3000`                           |
    /// | `SEARCH_SEMANTIC_WEIGHT`    | `0.6`                            |
    /// | `SEARCH_LEXICAL_WEIGHT`     | `0.4`                            |
    /// | `SEARCH_OVERSAMPLE_FACTOR`  | `3`                              |
    /// | `RECONCILE_INTERVAL_SECS`   | `60`                             |
    /// | `RECONCILE_BATCH_SIZE`      | `100`                            |
    /// | `BOOTSTRAP_ADMIN_EMAIL`     | --                               |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`  | --                               |
    ///
    /// # Panics
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_parse("PORT", 3000);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:8501".into()),
        );

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);

        let jwt = JwtConfig::from_env();

        let yandex_token = env_opt("YANDEX_OAUTH_TOKEN");
        let yandex_folder_id = env_opt("YANDEX_FOLDER_ID");
        let provider = ProviderKind::resolve(
            env_opt("EMBEDDING_PROVIDER").as_deref(),
            yandex_token.is_some() && yandex_folder_id.is_some(),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let dimension: usize = env_parse("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION);
        assert!(dimension > 0, "EMBEDDING_DIMENSION must be positive");

        let embedding = EmbeddingConfig {
            provider,
            yandex_token,
            yandex_folder_id,
            yandex_url: env_opt("YANDEX_EMBEDDING_URL")
                .unwrap_or_else(|| DEFAULT_YANDEX_EMBEDDING_URL.into()),
            dimension,
        };

        let qdrant = QdrantConfig {
            url: env_opt("QDRANT_URL"),
            collection: env_opt("QDRANT_COLLECTION")
                .unwrap_or_else(|| DEFAULT_QDRANT_COLLECTION.into()),
            api_key: env_opt("QDRANT_API_KEY"),
        };

        let weights = RankWeights::new(
            env_parse("SEARCH_SEMANTIC_WEIGHT", DEFAULT_SEMANTIC_WEIGHT),
            env_parse("SEARCH_LEXICAL_WEIGHT", DEFAULT_LEXICAL_WEIGHT),
        )
        .unwrap_or_else(|e| panic!("Invalid search weights: {e}"));
        let search = SearchSettings {
            weights,
            oversample_factor: env_parse("SEARCH_OVERSAMPLE_FACTOR", DEFAULT_OVERSAMPLE_FACTOR),
            ..SearchSettings::default()
        };

        let bootstrap_admin = match (
            env_opt("BOOTSTRAP_ADMIN_EMAIL"),
            env_opt("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            embedding,
            qdrant,
            semantic_timeout: Duration::from_millis(env_parse("SEMANTIC_TIMEOUT_MS", 3000)),
            search,
            reconcile_interval: Duration::from_secs(env_parse("RECONCILE_INTERVAL_SECS", 60)),
            reconcile_batch_size: env_parse("RECONCILE_BATCH_SIZE", 100),
            bootstrap_admin,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read a non-empty env var.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an env var, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        None => default,
    }
}
