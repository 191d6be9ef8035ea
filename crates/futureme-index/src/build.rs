//! Index construction.

use tracing::{info, warn};

use futureme_ingest::CommitRecord;
use futureme_llm::Embedder;

use crate::error::Result;
use crate::store::CommitIndex;

/// Rebuild the index from scratch with the given records.
///
/// The existing contents are always discarded first, so two runs over
/// the same input converge to the same index. An empty record set
/// still leaves a valid, queryable (empty) index behind.
pub async fn build_index(
    index: &CommitIndex,
    embedder: &dyn Embedder,
    records: &[CommitRecord],
) -> Result<()> {
    index.recreate()?;

    if records.is_empty() {
        warn!(index = %index.name(), "no records to index");
        return Ok(());
    }

    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != records.len() {
        return Err(crate::error::IndexError::Internal(format!(
            "embedder {} returned {} vectors for {} records",
            embedder.name(),
            embeddings.len(),
            records.len()
        )));
    }

    for (record, embedding) in records.iter().zip(embeddings.iter()) {
        index.upsert(record, embedding)?;
    }

    info!(
        index = %index.name(),
        records = records.len(),
        embedder = embedder.name(),
        "index build complete"
    );
    Ok(())
}
