//! Service category operations

use rusqlite::{params, OptionalExtension, Transaction, TransactionBehavior};
use crate::model::{self, CategoryFields, EntityStatus, ServiceCategory};
use crate::{Error, Result};
use super::sqlite::{conversion_error, now_micros, ShopStore};

const SELECT_CATEGORY: &str = r#"
    SELECT id, name, color, icon, description, active, created_at, updated_at
    FROM service_categories
"#;

impl ShopStore {
    /// All active categories, by name
    pub fn list_active_categories(&self) -> Result<Vec<ServiceCategory>> {
        let sql = format!("{} WHERE active = 1 ORDER BY name ASC, id ASC", SELECT_CATEGORY);
        let mut stmt = self.conn.prepare(&sql)?;

        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(categories)
    }

    /// Get an active category by id
    pub fn get_category(&self, id: i64) -> Result<Option<ServiceCategory>> {
        let sql = format!("{} WHERE id = ?1 AND active = 1", SELECT_CATEGORY);
        self.conn
            .query_row(&sql, [id], row_to_category)
            .optional()
            .map_err(Into::into)
    }

    /// Insert a category and return its id
    pub fn create_category(&self, fields: &CategoryFields) -> Result<i64> {
        fields.validate()?;
        let now = now_micros();

        self.conn
            .execute(
                r#"
                INSERT INTO service_categories (name, color, icon, description, active, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
                "#,
                params![fields.name, fields.color, fields.icon, fields.description, now],
            )
            .map_err(Error::from_write)?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created category {} ({})", id, fields.name);
        Ok(id)
    }

    /// Replace the mutable fields of an active category.
    ///
    /// Returns `false` when no active category has this id.
    pub fn update_category(&self, id: i64, fields: &CategoryFields) -> Result<bool> {
        fields.validate()?;

        let changed = self
            .conn
            .execute(
                r#"
                UPDATE service_categories
                SET name = ?1, color = ?2, icon = ?3, description = ?4,
                    updated_at = MAX(?5, updated_at + 1)
                WHERE id = ?6 AND active = 1
                "#,
                params![
                    fields.name,
                    fields.color,
                    fields.icon,
                    fields.description,
                    now_micros(),
                    id,
                ],
            )
            .map_err(Error::from_write)?;

        tracing::debug!("Updated category {} (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }

    /// Mark an active category inactive.
    ///
    /// Fails with [`Error::CategoryInUse`] and changes nothing while any
    /// active service references the category. The count and the write run
    /// in one immediate transaction, so no service can be attached in
    /// between. Returns `false` when no active category has this id.
    pub fn soft_delete_category(&self, id: i64) -> Result<bool> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let active_services: i64 = tx.query_row(
            "SELECT COUNT(*) FROM services WHERE category_id = ?1 AND active = 1",
            [id],
            |row| row.get(0),
        )?;

        if active_services > 0 {
            tracing::warn!(
                "Refusing to delete category {}: {} active service(s) reference it",
                id,
                active_services
            );
            // Dropping the transaction rolls it back.
            return Err(Error::CategoryInUse {
                id,
                active_services: active_services as usize,
            });
        }

        let changed = tx
            .execute(
                r#"
                UPDATE service_categories
                SET active = 0, updated_at = MAX(?1, updated_at + 1)
                WHERE id = ?2 AND active = 1
                "#,
                params![now_micros(), id],
            )
            .map_err(Error::from_write)?;
        tx.commit()?;

        tracing::debug!("Category {} -> inactive (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }

    /// Bring a soft-deleted category back. Returns `false` when no inactive
    /// category has this id.
    pub fn reactivate_category(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                r#"
                UPDATE service_categories
                SET active = 1, updated_at = MAX(?1, updated_at + 1)
                WHERE id = ?2 AND active = 0
                "#,
                params![now_micros(), id],
            )
            .map_err(Error::from_write)?;

        tracing::debug!("Category {} -> active (matched: {})", id, changed > 0);
        Ok(changed > 0)
    }
}

/// Helper to convert a row to a ServiceCategory
fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<ServiceCategory> {
    let status = EntityStatus::from_flag(row.get(5)?).map_err(|e| conversion_error(5, e))?;
    let created_at = model::from_micros(row.get(6)?).map_err(|e| conversion_error(6, e))?;
    let updated_at = model::from_micros(row.get(7)?).map_err(|e| conversion_error(7, e))?;

    Ok(ServiceCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
        description: row.get(4)?,
        status,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceFields;
    use rust_decimal::Decimal;

    fn bodywork() -> CategoryFields {
        CategoryFields::new("Bodywork", "#f59e0b", "spray-can").with_description("Dents and paint")
    }

    #[test]
    fn test_create_and_get_category() {
        let store = ShopStore::open_in_memory().unwrap();
        let fields = bodywork();

        let id = store.create_category(&fields).unwrap();
        let category = store.get_category(id).unwrap().unwrap();

        assert_eq!(category.id, id);
        assert_eq!(category.name, fields.name);
        assert_eq!(category.color, fields.color);
        assert_eq!(category.icon, fields.icon);
        assert_eq!(category.description, fields.description);
        assert_eq!(category.status, EntityStatus::Active);
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn test_list_categories_sorted_by_name() {
        let store = ShopStore::open_in_memory().unwrap();
        store.create_category(&CategoryFields::new("Alignment", "#000000", "ruler")).unwrap();

        let names: Vec<String> = store
            .list_active_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("Alignment"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_update_category() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();
        let before = store.get_category(id).unwrap().unwrap();

        let replacement = CategoryFields::new("Body & Paint", "#111111", "brush");
        assert!(store.update_category(id, &replacement).unwrap());

        let after = store.get_category(id).unwrap().unwrap();
        assert_eq!(after.name, "Body & Paint");
        assert_eq!(after.description, None);
        assert!(after.updated_at > before.updated_at);

        assert!(!store.update_category(424242, &replacement).unwrap());
    }

    #[test]
    fn test_soft_delete_category_in_use_is_refused() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();
        store
            .create_service(&ServiceFields::new("Dent Repair", Decimal::new(12000, 2), 120, id))
            .unwrap();

        let err = store.soft_delete_category(id).unwrap_err();
        assert!(
            matches!(err, Error::CategoryInUse { id: got, active_services: 1 } if got == id),
            "got {:?}",
            err
        );
        assert_eq!(store.get_category(id).unwrap().unwrap().status, EntityStatus::Active);
    }

    #[test]
    fn test_soft_delete_unused_category() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();

        assert!(store.soft_delete_category(id).unwrap());
        assert!(store.get_category(id).unwrap().is_none());
        assert!(store.list_active_categories().unwrap().iter().all(|c| c.id != id));
        assert!(!store.soft_delete_category(id).unwrap());
    }

    #[test]
    fn test_inactive_services_do_not_block_category_delete() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();
        let service = store
            .create_service(&ServiceFields::new("Scratch Removal", Decimal::new(5000, 2), 30, id))
            .unwrap();
        store.soft_delete_service(service).unwrap();

        assert!(store.soft_delete_category(id).unwrap());
    }

    #[test]
    fn test_refused_delete_leaves_connection_usable() {
        let store = ShopStore::open_in_memory().unwrap();
        assert!(store.soft_delete_category(1).is_err());

        // The rolled-back transaction must not linger.
        let id = store.create_category(&bodywork()).unwrap();
        assert!(store.soft_delete_category(id).unwrap());
    }

    #[test]
    fn test_reactivate_category() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();
        store.soft_delete_category(id).unwrap();

        assert!(store.reactivate_category(id).unwrap());
        assert!(store.get_category(id).unwrap().is_some());
        assert!(!store.reactivate_category(id).unwrap());
    }

    #[test]
    fn test_status_changes_refresh_updated_at() {
        let store = ShopStore::open_in_memory().unwrap();
        let id = store.create_category(&bodywork()).unwrap();
        let created = store.get_category(id).unwrap().unwrap().updated_at;

        store.soft_delete_category(id).unwrap();
        let deleted: i64 = store
            .conn
            .query_row("SELECT updated_at FROM service_categories WHERE id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert!(deleted > model::to_micros(created));

        store.reactivate_category(id).unwrap();
        let reactivated = store.get_category(id).unwrap().unwrap().updated_at;
        assert!(model::to_micros(reactivated) > deleted);
    }
}
