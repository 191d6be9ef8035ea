//! Query-time retrieval.

use std::sync::Arc;

use tracing::debug;

use futureme_ingest::CommitRecord;
use futureme_llm::SharedEmbedder;

use crate::error::Result;
use crate::store::CommitIndex;

/// Default number of records retrieved per query.
pub const DEFAULT_TOP_K: usize = 8;

/// Retrieves the records most relevant to a query string.
///
/// Must use the same embedder the index was built with or distances
/// are meaningless.
pub struct Retriever {
    index: Arc<CommitIndex>,
    embedder: SharedEmbedder,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<CommitIndex>, embedder: SharedEmbedder) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed the query and return up to `top_k` nearest records,
    /// most relevant first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<CommitRecord>> {
        let embedding = self.embedder.embed(query).await?;
        let hits = self.index.search(&embedding, self.top_k)?;
        debug!(query_len = query.len(), hits = hits.len(), "retrieved context");
        Ok(hits.into_iter().map(|hit| hit.record).collect())
    }
}
