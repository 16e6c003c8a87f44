//! SQLite schema definition.

/// Complete database schema for the embedded document store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Documents (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS documents (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,       -- insertion order
    collection TEXT NOT NULL,                    -- e.g. tutors/{t}/patients/{p}/appointments
    doc_id TEXT NOT NULL,
    body TEXT NOT NULL,                          -- JSON object
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (collection, doc_id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq);

-- Documents are never rewritten in place
CREATE TRIGGER IF NOT EXISTS documents_no_update BEFORE UPDATE ON documents
BEGIN
    SELECT RAISE(ABORT, 'Documents are immutable');
END;

-- Body must be a JSON object
CREATE TRIGGER IF NOT EXISTS documents_check_body BEFORE INSERT ON documents
WHEN json_type(new.body) IS NOT 'object'
BEGIN
    SELECT RAISE(ABORT, 'Document body must be a JSON object');
END;
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_documents_immutable() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?, ?, ?)",
            ["c", "d1", r#"{"title":"a"}"#],
        )
        .unwrap();

        let result = conn.execute("UPDATE documents SET body = '{}' WHERE doc_id = 'd1'", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_body_must_be_object() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?, ?, ?)",
            ["c", "d1", "[1, 2]"],
        );
        assert!(result.is_err());

        // Duplicate IDs within a collection are rejected
        conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?, ?, ?)",
            ["c", "d1", "{}"],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?, ?, ?)",
            ["c", "d1", "{}"],
        );
        assert!(result.is_err());
    }
}
