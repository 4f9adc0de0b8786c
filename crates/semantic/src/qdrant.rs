//! Qdrant collection used as the article vector index, over the official
//! gRPC client.

use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointStruct, PointsIdsList,
    QueryPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use wikisearch_core::types::DbId;

use crate::error::SemanticError;
use crate::index::{ScoredPoint, VectorIndex};

pub const DEFAULT_QDRANT_COLLECTION: &str = "articles";

/// One Qdrant collection. Point ids are article ids; each point carries the
/// article id in its payload as well.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantIndex {
    /// `url` is the gRPC endpoint, e.g. `http://localhost:6334`. `timeout`
    /// bounds every request made by the client.
    pub fn new(
        url: &str,
        collection: String,
        api_key: Option<String>,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, SemanticError> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .timeout(timeout)
            .skip_compatibility_check()
            .build()?;
        Ok(Self {
            client,
            collection,
            dimension,
        })
    }

    fn point_id(article_id: DbId) -> Result<u64, SemanticError> {
        u64::try_from(article_id).map_err(|_| SemanticError::InvalidPointId(article_id))
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), SemanticError> {
        if vector.len() != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Hits with UUID or out-of-range ids were not written by us and are dropped.
fn article_hit(point: &qdrant::ScoredPoint) -> Option<ScoredPoint> {
    match point.id.as_ref()?.point_id_options.as_ref()? {
        PointIdOptions::Num(n) => Some(ScoredPoint {
            article_id: DbId::try_from(*n).ok()?,
            score: point.score,
        }),
        PointIdOptions::Uuid(_) => None,
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn backend(&self) -> &'static str {
        "qdrant"
    }

    async fn ensure_ready(&self) -> Result<(), SemanticError> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }

        tracing::info!(
            collection = %self.collection,
            dimension = self.dimension,
            "Creating Qdrant collection",
        );
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await?;
        Ok(())
    }

    async fn upsert(&self, article_id: DbId, vector: &[f32]) -> Result<(), SemanticError> {
        self.check_dimension(vector)?;
        let mut payload = Payload::new();
        payload.insert("article_id", article_id);
        let point = PointStruct::new(Self::point_id(article_id)?, vector.to_vec(), payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await?;
        Ok(())
    }

    async fn delete(&self, article_id: DbId) -> Result<(), SemanticError> {
        let ids = PointsIdsList {
            ids: vec![Self::point_id(article_id)?.into()],
        };
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(ids)
                    .wait(true),
            )
            .await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPoint>, SemanticError> {
        self.check_dimension(vector)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .query(
                QueryPointsBuilder::new(&self.collection)
                    .query(vector.to_vec())
                    .limit(k as u64),
            )
            .await?;

        Ok(response.result.iter().filter_map(article_hit).collect())
    }
}
