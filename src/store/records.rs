//! Record storage, including the date-range listing used by the API.

use chrono::Utc;
use rusqlite::{params, Row, ToSql};

use super::{versioned::conditional_update, Store, StoreError};
use crate::models::Record;

/// Listing filters for a user's records. Sort values are whitelisted here;
/// anything unknown falls back to `id` so request input can never reach the
/// ORDER BY clause.
#[derive(Debug, Clone)]
pub struct RecordFilters {
    /// RFC 3339, UTC-normalized. `None` means no lower bound.
    pub start_date: Option<String>,
    /// RFC 3339, UTC-normalized.
    pub end_date: String,
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
}

impl RecordFilters {
    pub const SORT_KEYS: &'static [&'static str] =
        &["id", "amount", "created_at", "-id", "-amount", "-created_at"];

    fn sort_column(&self) -> &'static str {
        match self.sort.trim_start_matches('-') {
            "amount" => "amount",
            "created_at" => "created_at",
            _ => "id",
        }
    }

    fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    fn limit(&self) -> i64 {
        self.page_size
    }

    fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        amount: row.get(1)?,
        description: row.get(2)?,
        type_id: row.get(3)?,
        currency_id: row.get(4)?,
        user_id: row.get(5)?,
        created_at: row.get(6)?,
        version: row.get(7)?,
    })
}

impl Store {
    /// Insert a record owned by `user_id`. A dangling type or currency
    /// reference surfaces as `StoreError::ForeignKey`.
    pub fn create_record(
        &self,
        amount: i64,
        description: &str,
        type_id: i64,
        currency_id: i64,
        user_id: i64,
    ) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339();

        let (id, version) = conn.query_row(
            "INSERT INTO records (amount, description, type_id, currency_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, version",
            params![amount, description, type_id, currency_id, user_id, created_at],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(Record {
            id,
            amount,
            description: description.to_string(),
            type_id,
            currency_id,
            user_id,
            created_at,
            version,
        })
    }

    pub fn get_record(&self, id: i64) -> Result<Record, StoreError> {
        let conn = self.conn()?;
        let record = conn.query_row(
            "SELECT id, amount, description, type_id, currency_id, user_id, created_at, version
             FROM records WHERE id = ?1",
            params![id],
            row_to_record,
        )?;
        Ok(record)
    }

    pub fn list_records_for_user(
        &self,
        user_id: i64,
        filters: &RecordFilters,
    ) -> Result<Vec<Record>, StoreError> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT id, amount, description, type_id, currency_id, user_id, created_at, version
             FROM records
             WHERE user_id = ?1
               AND (?2 IS NULL OR created_at >= ?2)
               AND created_at <= ?3
             ORDER BY {} {}, id ASC
             LIMIT ?4 OFFSET ?5",
            filters.sort_column(),
            filters.sort_direction()
        );

        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                params![
                    user_id,
                    filters.start_date,
                    filters.end_date,
                    filters.limit(),
                    filters.offset()
                ],
                row_to_record,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Conditional update guarded by both version and owner, so a record can
    /// only ever be patched through its own user's row.
    pub fn update_record(&self, record: &Record, expected_version: i64) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let values: [&dyn ToSql; 4] = [
            &record.amount,
            &record.description,
            &record.type_id,
            &record.currency_id,
        ];

        conditional_update(
            &conn,
            "records",
            &["amount", "description", "type_id", "currency_id"],
            &values,
            record.id,
            expected_version,
            Some(record.user_id),
        )
    }

    pub fn delete_record(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
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

    fn seeded_store() -> (Store, i64, i64, i64, NamedTempFile) {
        let temp = NamedTempFile::new().unwrap();
        let store = Store::new(temp.path().to_str().unwrap()).unwrap();

        let user = store
            .create_user("alice", "alice@example.com", "hash", true)
            .unwrap();
        let currency = store.create_currency("USD", 1.0).unwrap();
        let record_type = store.create_record_type("expense").unwrap();

        (store, user.id, currency.id, record_type.id, temp)
    }

    fn default_filters() -> RecordFilters {
        RecordFilters {
            start_date: None,
            end_date: Utc::now().to_rfc3339(),
            page: 1,
            page_size: 20,
            sort: "id".to_string(),
        }
    }

    #[test]
    fn test_create_and_list_records() {
        let (store, user_id, currency_id, type_id, _temp) = seeded_store();

        let record = store
            .create_record(100, "groceries", type_id, currency_id, user_id)
            .unwrap();
        assert_eq!(record.version, 1);

        let listed = store
            .list_records_for_user(user_id, &default_filters())
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, 100);

        // Another user's listing is empty.
        let other = store
            .create_user("bob", "bob@example.com", "hash", true)
            .unwrap();
        assert!(store
            .list_records_for_user(other.id, &default_filters())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_dangling_reference_is_foreign_key_error() {
        let (store, user_id, currency_id, _type_id, _temp) = seeded_store();

        let err = store
            .create_record(100, "bad type", 999, currency_id, user_id)
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey));
    }

    #[test]
    fn test_update_record_version_and_owner() {
        let (store, user_id, currency_id, type_id, _temp) = seeded_store();

        let mut record = store
            .create_record(100, "groceries", type_id, currency_id, user_id)
            .unwrap();

        record.amount = 150;
        assert_eq!(store.update_record(&record, 1).unwrap(), 2);
        assert!(matches!(
            store.update_record(&record, 1),
            Err(StoreError::EditConflict)
        ));

        // A different owner id never matches the row.
        record.user_id = user_id + 100;
        assert!(matches!(
            store.update_record(&record, 2),
            Err(StoreError::EditConflict)
        ));
    }

    #[test]
    fn test_delete_cascades_comments() {
        let (store, user_id, currency_id, type_id, _temp) = seeded_store();

        let record = store
            .create_record(100, "groceries", type_id, currency_id, user_id)
            .unwrap();
        store.create_comment(record.id, "looks high").unwrap();

        store.delete_record(record.id).unwrap();
        assert!(store.list_comments_for_record(record.id).unwrap().is_empty());
    }

    #[test]
    fn test_sort_whitelist() {
        let filters = RecordFilters {
            sort: "-amount".to_string(),
            ..default_filters()
        };
        assert_eq!(filters.sort_column(), "amount");
        assert_eq!(filters.sort_direction(), "DESC");

        let bad = RecordFilters {
            sort: "password_hash; DROP TABLE users".to_string(),
            ..default_filters()
        };
        assert_eq!(bad.sort_column(), "id");
    }
}
