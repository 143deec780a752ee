//! Service operations

use std::str::FromStr;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use rust_decimal::Decimal;
use crate::model::{self, CategorySummary, EntityStatus, Service, ServiceFields};
use crate::{Error, Result};
use super::sqlite::{conversion_error, now_micros, ShopStore};

const SELECT_SERVICE: &str = r#"
    SELECT s.id, s.name, s.description, s.price, s.duration_minutes, s.active,
           s.created_at, s.updated_at, c.id, c.name, c.color, c.icon
    FROM services s
    JOIN service_categories c ON c.id = s.category_id
"#;

impl ShopStore {
    /// All active services with their category display fields, by name
    pub fn list_active_services(&self) -> Result<Vec<Service>> {
        let sql = format!("{} WHERE s.active = 1 ORDER BY s.name ASC, s.id ASC", SELECT_SERVICE);
        let mut stmt = self.conn.prepare(&sql)?;

        let services = stmt
            .query_map([], row_to_service)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(services)
    }

    /// Get an active service by id
    pub fn get_service(&self, id: i64) -> Result<Option<Service>> {
        let sql = format!("{} WHERE s.id = ?1 AND s.active = 1", SELECT_SERVICE);
        self.conn
            .query_row(&sql, [id], row_to_service)
            .optional()
            .map_err(Into::into)
    }

    /// Insert a service and return its id.
    ///
    /// Fails with [`Error::ConstraintViolation`] when `category_id` does not
    /// reference an existing category, and with [`Error::CategoryInactive`]
    /// when that category has been soft-deleted.
    pub fn create_service(&self, fields: &ServiceFields) -> Result<i64> {
        fields.validate()?;
        let now = now_micros();

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        ensure_category_active(&tx, fields.category_id)?;

        tx.execute(
            r#"
            INSERT INTO services (name, description, price, duration_minutes, category_id, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
            params![
                fields.name,
                fields.description,
                fields.price.to_string(),
                fields.duration_minutes,
                fields.category_id,
                now,
            ],
        )
        .map_err(Error::from_write)?;

        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!("Created service {} ({})", id, fields.name);
        Ok(id)
    }

    /// Replace the mutable fields of an active service.
    ///
    /// Returns `false` when no active service has this id. Moving a service
    /// into a soft-deleted category fails with [`Error::CategoryInactive`].
    pub fn update_service(&self, id: i64, fields: &ServiceFields) -> Result<bool> {
        fields.validate()?;

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        ensure_category_active(&tx, fields.category_id)?;

        let changed = tx
            .execute(
                r#"
                UPDATE services
                SET name = ?1, description = ?2, price = ?3, duration_minutes = ?4,
                    category_id = ?5, updated_at = MAX(?6, updated_at + 1)
                WHERE id = ?7 AND active = 1
                "#,
                params![
                    fields.name,
                    fields.description,
                    fields.price.to_string(),
                    fields.duration_minutes,
                    fields.category_id,
                    now_micros(),
                    id,
                ],
            )
            .map_err(Error::from_write)?;
        tx.commit()?;

        tracing::debug!("Updated service {} (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }

    /// Mark an active service inactive. Returns `false` when no active
    /// service has this id.
    pub fn soft_delete_service(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                r#"
                UPDATE services
                SET active = ?1, updated_at = MAX(?2, updated_at + 1)
                WHERE id = ?3 AND active = 1
                "#,
                params![EntityStatus::Inactive.as_flag(), now_micros(), id],
            )
            .map_err(Error::from_write)?;

        tracing::debug!("Service {} -> inactive (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }

    /// Bring a soft-deleted service back. Returns `false` when no inactive
    /// service has this id; fails with [`Error::CategoryInactive`] while its
    /// category is soft-deleted.
    pub fn reactivate_service(&self, id: i64) -> Result<bool> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let category_id: Option<i64> = tx
            .query_row(
                "SELECT category_id FROM services WHERE id = ?1 AND active = 0",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(category_id) = category_id else {
            return Ok(false);
        };
        ensure_category_active(&tx, category_id)?;

        let changed = tx
            .execute(
                r#"
                UPDATE services
                SET active = ?1, updated_at = MAX(?2, updated_at + 1)
                WHERE id = ?3 AND active = 0
                "#,
                params![EntityStatus::Active.as_flag(), now_micros(), id],
            )
            .map_err(Error::from_write)?;
        tx.commit()?;

        tracing::debug!("Service {} -> active (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }

    /// Count active services in a category
    pub fn count_active_services_in_category(&self, category_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM services WHERE category_id = ?1 AND active = 1",
            [category_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Refuse to attach active services to a soft-deleted category.
///
/// A missing category passes here; the foreign key rejects it on write.
fn ensure_category_active(conn: &Connection, category_id: i64) -> Result<()> {
    let active: Option<i64> = conn
        .query_row(
            "SELECT active FROM service_categories WHERE id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .optional()?;

    match active.map(EntityStatus::from_flag).transpose()? {
        Some(EntityStatus::Inactive) => {
            tracing::warn!("Refusing to attach a service to inactive category {}", category_id);
            Err(Error::CategoryInactive { id: category_id })
        }
        _ => Ok(()),
    }
}

/// Helper to convert a joined row to a Service
fn row_to_service(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    let price_str: String = row.get(3)?;
    let price = Decimal::from_str(&price_str).map_err(|e| {
        conversion_error(3, Error::InvalidValue(format!("price {:?}: {}", price_str, e)))
    })?;

    let status = EntityStatus::from_flag(row.get(5)?).map_err(|e| conversion_error(5, e))?;
    let created_at = model::from_micros(row.get(6)?).map_err(|e| conversion_error(6, e))?;
    let updated_at = model::from_micros(row.get(7)?).map_err(|e| conversion_error(7, e))?;

    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price,
        duration_minutes: row.get(4)?,
        status,
        created_at,
        updated_at,
        category: CategorySummary {
            id: row.get(8)?,
            name: row.get(9)?,
            color: row.get(10)?,
            icon: row.get(11)?,
        },
    })
}
