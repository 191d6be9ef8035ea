//! Commit index backed by sqlite-vec.
//!
//! Each index is a pair of tables named after the index: a document
//! table holding the commit records and a vec0 virtual table holding
//! their embeddings, keyed by commit SHA.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};
use zerocopy::IntoBytes;

use futureme_ingest::CommitRecord;

use crate::error::{IndexError, Result};

/// Initialize the sqlite-vec extension.
///
/// Uses `sqlite3_auto_extension`, so it applies globally to every
/// connection opened afterwards. Must be called before the first
/// [`CommitIndex::open`].
pub fn init_vector_extension() {
    use rusqlite::ffi::sqlite3_auto_extension;
    use sqlite_vec::sqlite3_vec_init;

    unsafe {
        #[allow(clippy::missing_transmute_annotations)]
        sqlite3_auto_extension(Some(std::mem::transmute(sqlite3_vec_init as *const ())));
    }
}

/// A scored search hit.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: CommitRecord,
    /// Distance from the query vector (lower = more similar).
    pub distance: f32,
}

/// Vector index over commit records.
#[derive(Debug)]
pub struct CommitIndex {
    conn: Mutex<Connection>,
    name: String,
    dims: usize,
}

impl CommitIndex {
    /// Open an index at `path`, or in memory when `path` is `None`.
    pub fn open(path: Option<&Path>, name: &str, dims: usize) -> Result<Self> {
        validate_name(name)?;
        init_vector_extension();
        let conn = match path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        Ok(Self {
            conn: Mutex::new(conn),
            name: name.to_string(),
            dims,
        })
    }

    /// Index name, used as the table name prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embedding dimensions this index was opened with.
    pub fn dims(&self) -> usize {
        self.dims
    }

    fn docs_table(&self) -> String {
        format!("{}_docs", self.name)
    }

    fn vec_table(&self) -> String {
        format!("{}_vec", self.name)
    }

    /// Drop and recreate both tables, discarding any previous contents.
    ///
    /// Dropping tables that do not exist yet is not an error, so a
    /// fresh database and a stale one go through the same path.
    pub fn recreate(&self) -> Result<()> {
        let conn = self.lock();
        conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {docs}; DROP TABLE IF EXISTS {vec};",
            docs = self.docs_table(),
            vec = self.vec_table(),
        ))?;
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE {docs} (
                sha TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                repo TEXT NOT NULL,
                author_name TEXT NOT NULL,
                author_email TEXT NOT NULL,
                date TEXT,
                url TEXT
            );
            CREATE VIRTUAL TABLE {vec} USING vec0(
                sha TEXT PRIMARY KEY,
                embedding float[{dims}]
            );
            "#,
            docs = self.docs_table(),
            vec = self.vec_table(),
            dims = self.dims,
        ))?;
        info!(index = %self.name, dims = self.dims, "recreated index tables");
        Ok(())
    }

    /// Insert or replace a record and its embedding.
    pub fn upsert(&self, record: &CommitRecord, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dims {
            return Err(IndexError::DimensionMismatch {
                expected: self.dims,
                actual: embedding.len(),
            });
        }
        let conn = self.lock();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (sha, text, repo, author_name, author_email, date, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.docs_table()
            ),
            params![
                record.sha,
                record.text,
                record.repo,
                record.author_name,
                record.author_email,
                record.date.map(|d| d.to_rfc3339()),
                record.url,
            ],
        )?;
        // vec0 doesn't support INSERT OR REPLACE, so delete first.
        conn.execute(
            &format!("DELETE FROM {} WHERE sha = ?1", self.vec_table()),
            params![record.sha],
        )?;
        conn.execute(
            &format!(
                "INSERT INTO {} (sha, embedding) VALUES (?1, ?2)",
                self.vec_table()
            ),
            params![record.sha, embedding.as_bytes()],
        )?;
        debug!(sha = %record.sha, "upserted record");
        Ok(())
    }

    /// Return the `limit` records nearest to the query vector,
    /// ordered by ascending distance.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<ScoredRecord>> {
        if query.len() != self.dims {
            return Err(IndexError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT sha, distance
            FROM {}
            WHERE embedding MATCH ?1
            ORDER BY distance
            LIMIT ?2
            "#,
            self.vec_table()
        ))?;
        let mut rows = stmt.query(params![query.as_bytes(), limit as i64])?;

        let mut hits: Vec<(String, f32)> = Vec::new();
        while let Some(row) = rows.next()? {
            hits.push((row.get(0)?, row.get(1)?));
        }
        drop(rows);
        drop(stmt);

        let mut results = Vec::with_capacity(hits.len());
        for (sha, distance) in hits {
            let record = fetch_record(&conn, &self.docs_table(), &sha)?.ok_or_else(|| {
                IndexError::Internal(format!("vector hit {sha} has no document row"))
            })?;
            results.push(ScoredRecord { record, distance });
        }

        debug!(count = results.len(), limit, "similarity search");
        Ok(results)
    }

    /// Number of indexed records.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.docs_table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means a panic mid-write; propagating the
        // panic is the only sane option.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn fetch_record(conn: &Connection, docs_table: &str, sha: &str) -> Result<Option<CommitRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT sha, text, repo, author_name, author_email, date, url
         FROM {docs_table} WHERE sha = ?1"
    ))?;
    let mut rows = stmt.query(params![sha])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let date: Option<String> = row.get(5)?;
    Ok(Some(CommitRecord {
        sha: row.get(0)?,
        text: row.get(1)?,
        repo: row.get(2)?,
        author_name: row.get(3)?,
        author_email: row.get(4)?,
        date: date
            .as_deref()
            .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.with_timezone(&Utc)),
        url: row.get(6)?,
    }))
}

fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if ok {
        Ok(())
    } else {
        Err(IndexError::Internal(format!(
            "invalid index name {name:?}: use alphanumerics and underscores"
        )))
    }
}
