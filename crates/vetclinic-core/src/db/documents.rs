//! Document collection operations.

use rusqlite::params;

use super::{Database, DbError, DbResult};

/// A stored document row.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    /// Document ID, unique within its collection
    pub doc_id: String,
    /// Raw JSON body
    pub body: String,
    /// Insertion timestamp
    pub created_at: String,
}

impl Database {
    /// Insert a document into a collection.
    pub fn insert_document(&self, collection: &str, doc_id: &str, body: &str) -> DbResult<()> {
        let result = self.conn.execute(
            r#"
            INSERT INTO documents (collection, doc_id, body)
            VALUES (?1, ?2, ?3)
            "#,
            params![collection, doc_id, body],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, msg))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(DbError::Constraint(msg.unwrap_or_else(|| {
                    format!("Document {} rejected in {}", doc_id, collection)
                })))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all documents in a collection, in insertion order.
    pub fn list_documents(&self, collection: &str) -> DbResult<Vec<DocumentRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT doc_id, body, created_at
            FROM documents
            WHERE collection = ?
            ORDER BY seq
            "#,
        )?;

        let rows = stmt.query_map([collection], |row| {
            Ok(DocumentRow {
                doc_id: row.get(0)?,
                body: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
