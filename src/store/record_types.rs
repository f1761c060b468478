//! Record type storage.

use chrono::Utc;
use rusqlite::{params, Row, ToSql};

use super::{versioned::conditional_update, Store, StoreError};
use crate::models::RecordType;

fn row_to_record_type(row: &Row) -> rusqlite::Result<RecordType> {
    Ok(RecordType {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        version: row.get(3)?,
    })
}

impl Store {
    pub fn list_record_types(&self) -> Result<Vec<RecordType>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name, created_at, version FROM record_types ORDER BY name ASC")?;
        let types = stmt
            .query_map([], row_to_record_type)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(types)
    }

    pub fn get_record_type(&self, id: i64) -> Result<RecordType, StoreError> {
        let conn = self.conn()?;
        let record_type = conn.query_row(
            "SELECT id, name, created_at, version FROM record_types WHERE id = ?1",
            params![id],
            row_to_record_type,
        )?;
        Ok(record_type)
    }

    pub fn create_record_type(&self, name: &str) -> Result<RecordType, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339();

        let (id, version) = conn.query_row(
            "INSERT INTO record_types (name, created_at)
             VALUES (?1, ?2)
             RETURNING id, version",
            params![name, created_at],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(RecordType {
            id,
            name: name.to_string(),
            created_at,
            version,
        })
    }

    pub fn update_record_type(
        &self,
        record_type: &RecordType,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let values: [&dyn ToSql; 1] = [&record_type.name];

        conditional_update(
            &conn,
            "record_types",
            &["name"],
            &values,
            record_type.id,
            expected_version,
            None,
        )
    }

    pub fn delete_record_type(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM record_types WHERE id = ?1", params![id])?;
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

    fn test_store() -> (Store, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let store = Store::new(temp.path().to_str().unwrap()).unwrap();
        (store, temp)
    }

    #[test]
    fn test_record_type_lifecycle() {
        let (store, _temp) = test_store();

        let expense = store.create_record_type("expense").unwrap();
        assert_eq!(expense.version, 1);

        let mut renamed = expense.clone();
        renamed.name = "spending".to_string();
        assert_eq!(store.update_record_type(&renamed, 1).unwrap(), 2);

        let all = store.list_record_types().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "spending");

        store.delete_record_type(expense.id).unwrap();
        assert!(store.list_record_types().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_type_name() {
        let (store, _temp) = test_store();

        store.create_record_type("income").unwrap();
        let err = store.create_record_type("income").unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(col) if col == "name"));
    }
}
