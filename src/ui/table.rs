use tabled::{settings::Style, Table, Tabled};

use crate::model::{Service, ServiceCategory};
use crate::storage::TableCounts;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Service")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Minutes")]
    duration: u32,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Icon")]
    icon: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Table")]
    table: String,
    #[tabled(rename = "Rows")]
    rows: usize,
}

fn rounded<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn services_table(services: &[Service]) -> String {
    let rows: Vec<ServiceRow> = services
        .iter()
        .map(|s| ServiceRow {
            id: s.id,
            name: s.name.clone(),
            category: s.category.name.clone(),
            price: s.price.to_string(),
            duration: s.duration_minutes,
        })
        .collect();
    rounded(&rows)
}

pub fn categories_table(categories: &[ServiceCategory]) -> String {
    let rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            id: c.id,
            name: c.name.clone(),
            color: c.color.clone(),
            icon: c.icon.clone(),
            description: c.description.clone().unwrap_or_default(),
        })
        .collect();
    rounded(&rows)
}

pub fn counts_table(counts: &TableCounts) -> String {
    let rows: Vec<CountRow> = counts
        .tables
        .iter()
        .map(|t| CountRow {
            table: t.table.clone(),
            rows: t.rows,
        })
        .collect();
    rounded(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShopStore;

    #[test]
    fn test_services_table_lists_seed_rows() {
        let store = ShopStore::open_in_memory().unwrap();
        let table = services_table(&store.list_active_services().unwrap());
        assert!(table.contains("Oil Change"));
        assert!(table.contains("Maintenance"));
        assert!(table.contains("49.99"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert!(categories_table(&[]).is_empty());
    }
}
