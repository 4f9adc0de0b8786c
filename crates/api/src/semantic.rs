//! Builds the embedding provider and vector index selected by configuration.

use std::sync::Arc;

use wikisearch_semantic::{
    DisabledEmbedder, EmbeddingProvider, HashingEmbedder, MemoryVectorIndex, QdrantIndex,
    SemanticError, VectorIndex, YandexEmbedder,
};

use crate::config::{EmbeddingConfig, ProviderKind, QdrantConfig};

/// Construct the configured embedding provider.
pub fn build_provider(
    config: &EmbeddingConfig,
    timeout: std::time::Duration,
) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Yandex => {
            let (Some(token), Some(folder_id)) = (&config.yandex_token, &config.yandex_folder_id)
            else {
                return Err(SemanticError::ProviderUnavailable(
                    "Yandex credentials are not configured".into(),
                ));
            };
            Arc::new(YandexEmbedder::new(
                config.yandex_url.clone(),
                token.clone(),
                folder_id.clone(),
                config.dimension,
                timeout,
            )?)
        }
        ProviderKind::Hashing => Arc::new(HashingEmbedder::new(config.dimension)),
        ProviderKind::Disabled => Arc::new(DisabledEmbedder::new(config.dimension)),
    };

    tracing::info!(
        model = provider.model(),
        dimension = provider.dimension(),
        enabled = provider.is_enabled(),
        "Embedding provider configured"
    );
    Ok(provider)
}

/// Construct the configured vector index: Qdrant when a URL is set,
/// otherwise an in-process index that starts empty on every boot.
pub fn build_index(
    config: &QdrantConfig,
    dimension: usize,
    timeout: std::time::Duration,
) -> Result<Arc<dyn VectorIndex>, SemanticError> {
    let index: Arc<dyn VectorIndex> = match &config.url {
        Some(url) => Arc::new(QdrantIndex::new(
            url,
            config.collection.clone(),
            config.api_key.clone(),
            dimension,
            timeout,
        )?),
        None => Arc::new(MemoryVectorIndex::new(dimension)),
    };

    tracing::info!(backend = index.backend(), dimension, "Vector index configured");
    Ok(index)
}
