// Service exports
pub mod embedding;

pub use embedding::{build_embedder, DisabledEmbedder, HashingEmbedder, HttpEmbeddingClient};
