//! Comment storage.

use chrono::Utc;
use rusqlite::{params, Row, ToSql};

use super::{versioned::conditional_update, Store, StoreError};
use crate::models::Comment;

fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        record_id: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        version: row.get(4)?,
    })
}

impl Store {
    pub fn create_comment(&self, record_id: i64, description: &str) -> Result<Comment, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339();

        let (id, version) = conn.query_row(
            "INSERT INTO comments (record_id, description, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING id, version",
            params![record_id, description, created_at],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(Comment {
            id,
            record_id,
            description: description.to_string(),
            created_at,
            version,
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Comment, StoreError> {
        let conn = self.conn()?;
        let comment = conn.query_row(
            "SELECT id, record_id, description, created_at, version
             FROM comments WHERE id = ?1",
            params![id],
            row_to_comment,
        )?;
        Ok(comment)
    }

    pub fn list_comments_for_record(&self, record_id: i64) -> Result<Vec<Comment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, record_id, description, created_at, version
             FROM comments WHERE record_id = ?1 ORDER BY id ASC",
        )?;
        let comments = stmt
            .query_map(params![record_id], row_to_comment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    pub fn update_comment(
        &self,
        comment: &Comment,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let values: [&dyn ToSql; 1] = [&comment.description];

        conditional_update(
            &conn,
            "comments",
            &["description"],
            &values,
            comment.id,
            expected_version,
            None,
        )
    }

    pub fn delete_comment(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::NamedTempFile;

    fn seeded_store() -> (Store, i64, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let store = Store::new(temp.path().to_str().unwrap()).unwrap();

        let user = store
            .create_user("alice", "alice@example.com", "hash", true)
            .unwrap();
        let currency = store.create_currency("USD", 1.0).unwrap();
        let record_type = store.create_record_type("expense").unwrap();
        let record = store
            .create_record(100, "groceries", record_type.id, currency.id, user.id)
            .unwrap();

        (store, record.id, temp)
    }

    #[test]
    fn test_comment_lifecycle() {
        let (store, record_id, _temp) = seeded_store();

        let comment = store.create_comment(record_id, "seems expensive").unwrap();
        assert_eq!(comment.version, 1);

        let mut edited = comment.clone();
        edited.description = "actually fine".to_string();
        assert_eq!(store.update_comment(&edited, 1).unwrap(), 2);
        assert!(matches!(
            store.update_comment(&edited, 1),
            Err(StoreError::EditConflict)
        ));

        let listed = store.list_comments_for_record(record_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description, "actually fine");

        store.delete_comment(comment.id).unwrap();
        assert!(matches!(
            store.get_comment(comment.id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_comment_requires_record() {
        let (store, _record_id, _temp) = seeded_store();
        let err = store.create_comment(999, "orphan").unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey));
    }
}
