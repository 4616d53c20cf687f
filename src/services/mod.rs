// Service exports
pub mod embedding;
pub mod reasons;
pub mod vector;

pub use embedding::{EmbeddingClient, EmbeddingError};
pub use reasons::ReasonEngine;
pub use vector::{SearchHit, VectorStoreClient, VectorStoreError};
