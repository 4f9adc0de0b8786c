//! External semantic collaborators: embedding providers and vector indexes.
//!
//! Both are object-safe traits so the API can pick an implementation at
//! startup from configuration and hold it as `Arc<dyn ...>`:
//!
//! | Concern   | Remote                 | Local                                  |
//! |-----------|------------------------|----------------------------------------|
//! | Embedding | [`YandexEmbedder`]     | [`HashingEmbedder`], [`DisabledEmbedder`] |
//! | Index     | [`QdrantIndex`]        | [`MemoryVectorIndex`]                  |

pub mod error;
pub mod index;
pub mod memory;
pub mod provider;
pub mod qdrant;
pub mod yandex;

pub use error::SemanticError;
pub use index::{ScoredPoint, VectorIndex};
pub use memory::{DisabledEmbedder, HashingEmbedder, MemoryVectorIndex};
pub use provider::EmbeddingProvider;
pub use qdrant::QdrantIndex;
pub use yandex::YandexEmbedder;
