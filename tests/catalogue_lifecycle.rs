use garagebook::{CategoryFields, EntityStatus, Error, ServiceFields, ShopStore};
use rust_decimal::Decimal;

#[test]
fn test_seeded_service_lifecycle_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShopStore::open(&dir.path().join("data").join("shop.db")).unwrap();

    let counts = store.table_counts().unwrap();
    assert!(counts.get("service_categories").unwrap() >= 1);
    assert!(counts.get("services").unwrap() >= 1);

    let services = store.list_active_services().unwrap();
    let scan = services
        .iter()
        .find(|s| s.name == "Engine Diagnostic Scan")
        .expect("seed service present");
    assert_eq!(scan.category.name, "Diagnostics");
    assert_eq!(scan.category.color, "#10b981");
    assert_eq!(scan.category.icon, "gauge");

    let category_id = scan.category.id;
    assert!(matches!(
        store.soft_delete_category(category_id),
        Err(Error::CategoryInUse { .. })
    ));

    assert!(store.soft_delete_service(scan.id).unwrap());
    assert!(store
        .list_active_services()
        .unwrap()
        .iter()
        .all(|s| s.id != scan.id));

    assert!(store.soft_delete_category(category_id).unwrap());
    assert!(store.get_category(category_id).unwrap().is_none());
    store.close().unwrap();
}

#[test]
fn test_initializer_twice_keeps_data_and_seeds() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.db");

    let first = ShopStore::open(&db_path).unwrap();
    let seeded = first.table_counts().unwrap();
    let category_id = first
        .create_category(&CategoryFields::new("Detailing", "#a855f7", "sparkles"))
        .unwrap();
    first.close().unwrap();

    let second = ShopStore::open(&db_path).unwrap();
    let counts = second.table_counts().unwrap();
    assert_eq!(
        counts.get("services"),
        seeded.get("services"),
        "seed services duplicated"
    );
    assert_eq!(
        counts.get("service_categories"),
        seeded.get("service_categories").map(|n| n + 1)
    );
    assert!(second.get_category(category_id).unwrap().is_some());
}

#[test]
fn test_foreign_keys_enforced_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("shop.db");
    ShopStore::open(&db_path).unwrap().close().unwrap();

    let store = ShopStore::open(&db_path).unwrap();
    let before = store.table_counts().unwrap().get("services");

    let err = store
        .create_service(&ServiceFields::new("Orphan", Decimal::new(100, 0), 10, 777))
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)));
    assert_eq!(store.table_counts().unwrap().get("services"), before);
}

#[test]
fn test_update_round_trip() {
    let store = ShopStore::open_in_memory().unwrap();
    let category_id = store
        .create_category(&CategoryFields::new("Electrical", "#eab308", "bolt"))
        .unwrap();
    let id = store
        .create_service(&ServiceFields::new("Battery Test", Decimal::new(1500, 2), 15, category_id))
        .unwrap();
    let before = store.get_service(id).unwrap().unwrap();

    let fields = ServiceFields::new("Battery Replacement", Decimal::new(18999, 2), 30, category_id)
        .with_description("Includes disposal of the old battery");
    assert!(store.update_service(id, &fields).unwrap());

    let after = store.get_service(id).unwrap().unwrap();
    assert_eq!(after.name, fields.name);
    assert_eq!(after.description, fields.description);
    assert_eq!(after.price, fields.price);
    assert_eq!(after.duration_minutes, fields.duration_minutes);
    assert_eq!(after.category.id, fields.category_id);
    assert_eq!(after.status, EntityStatus::Active);
    assert!(after.updated_at > before.updated_at);
}
