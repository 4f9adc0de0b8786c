//! REST client for the Yandex Cloud text embedding API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wikisearch_core::embedding::{validate_embedding, EmbeddingPurpose};

use crate::error::SemanticError;
use crate::provider::EmbeddingProvider;

/// Default endpoint of the Foundation Models embedding API.
pub const DEFAULT_YANDEX_EMBEDDING_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/textEmbedding";

const SERVICE: &str = "Yandex embeddings";

/// HTTP client for Yandex `text-search-doc` / `text-search-query` models.
///
/// The two model variants are asymmetric: stored articles are embedded with
/// the `doc` model and search queries with the `query` model.
pub struct YandexEmbedder {
    client: reqwest::Client,
    url: String,
    token: String,
    folder_id: String,
    dimension: usize,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingRequest<'a> {
    model_uri: String,
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl YandexEmbedder {
    /// Build a client.
    ///
    /// * `url` - Endpoint, normally [`DEFAULT_YANDEX_EMBEDDING_URL`].
    /// * `timeout` - Per-request timeout applied by the HTTP client.
    pub fn new(
        url: String,
        token: String,
        folder_id: String,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, SemanticError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let model = format!("emb://{folder_id}/text-search-doc/latest");
        Ok(Self {
            client,
            url,
            token,
            folder_id,
            dimension,
            model,
        })
    }

    fn model_uri(&self, purpose: EmbeddingPurpose) -> String {
        let variant = match purpose {
            EmbeddingPurpose::Document => "text-search-doc",
            EmbeddingPurpose::Query => "text-search-query",
        };
        format!("emb://{}/{variant}/latest", self.folder_id)
    }
}

#[async_trait]
impl EmbeddingProvider for YandexEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(
        &self,
        text: &str,
        purpose: EmbeddingPurpose,
    ) -> Result<Vec<f32>, SemanticError> {
        let body = EmbeddingRequest {
            model_uri: self.model_uri(purpose),
            text,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header("x-folder-id", &self.folder_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SemanticError::Api {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| SemanticError::InvalidResponse {
                    service: SERVICE,
                    reason: e.to_string(),
                })?;

        if parsed.embedding.len() != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                actual: parsed.embedding.len(),
            });
        }
        validate_embedding(&parsed.embedding, self.dimension).map_err(|e| {
            SemanticError::InvalidResponse {
                service: SERVICE,
                reason: e.to_string(),
            }
        })?;

        Ok(parsed.embedding)
    }
}
