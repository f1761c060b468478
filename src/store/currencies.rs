//! Currency storage.

use chrono::Utc;
use rusqlite::{params, Row, ToSql};

use super::{versioned::conditional_update, Store, StoreError};
use crate::models::Currency;

fn row_to_currency(row: &Row) -> rusqlite::Result<Currency> {
    Ok(Currency {
        id: row.get(0)?,
        name: row.get(1)?,
        rate: row.get(2)?,
        created_at: row.get(3)?,
        version: row.get(4)?,
    })
}

impl Store {
    pub fn list_currencies(&self) -> Result<Vec<Currency>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, rate, created_at, version FROM currencies ORDER BY name ASC",
        )?;
        let currencies = stmt
            .query_map([], row_to_currency)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(currencies)
    }

    pub fn get_currency(&self, id: i64) -> Result<Currency, StoreError> {
        let conn = self.conn()?;
        let currency = conn.query_row(
            "SELECT id, name, rate, created_at, version FROM currencies WHERE id = ?1",
            params![id],
            row_to_currency,
        )?;
        Ok(currency)
    }

    /// Duplicate names surface as `StoreError::Duplicate("name")`.
    pub fn create_currency(&self, name: &str, rate: f64) -> Result<Currency, StoreError> {
        let conn = self.conn()?;
        let created_at = Utc::now().to_rfc3339();

        let (id, version) = conn.query_row(
            "INSERT INTO currencies (name, rate, created_at)
             VALUES (?1, ?2, ?3)
             RETURNING id, version",
            params![name, rate, created_at],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
        )?;

        Ok(Currency {
            id,
            name: name.to_string(),
            rate,
            created_at,
            version,
        })
    }

    pub fn update_currency(
        &self,
        currency: &Currency,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        let values: [&dyn ToSql; 2] = [&currency.name, &currency.rate];

        conditional_update(
            &conn,
            "currencies",
            &["name", "rate"],
            &values,
            currency.id,
            expected_version,
            None,
        )
    }

    pub fn delete_currency(&self, id: i64) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM currencies WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
