use super::*;

#[tokio::test]
async fn test_upsert_category_creates_then_updates() {
    let (db, _f) = test_db().await;

    let created = db.upsert_category("Marketing", "marketing").await.unwrap();
    assert_eq!(created.name, "Marketing");
    assert_eq!(created.slug, "marketing");

    let updated = db.upsert_category("Marketing Team", "marketing").await.unwrap();
    assert_eq!(updated.id, created.id, "slug conflict should update in place");
    assert_eq!(updated.name, "Marketing Team");

    assert_eq!(db.list_categories().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_categories_ordered_by_name() {
    let (db, _f) = test_db().await;

    db.upsert_category("Zebra", "zebra").await.unwrap();
    db.upsert_category("Apple", "apple").await.unwrap();

    let names: Vec<String> = db
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Apple", "Zebra"]);
}

#[tokio::test]
async fn test_delete_category() {
    let (db, _f) = test_db().await;

    db.upsert_category("Temp", "temp").await.unwrap();
    assert!(db.delete_category("temp").await.unwrap());
    assert!(!db.delete_category("temp").await.unwrap());
    assert!(db.get_category_by_slug("temp").await.unwrap().is_none());
}

#[tokio::test]
async fn test_asset_category_links_cascade_on_asset_delete() {
    let (db, _f) = test_db().await;

    let id = db.insert_asset(&test_asset(false)).await.unwrap();
    let category = db.upsert_category("News", "news").await.unwrap();

    db.link_asset_category(id, category.id).await.unwrap();
    // Linking twice is idempotent
    db.link_asset_category(id, category.id).await.unwrap();
    assert_eq!(db.asset_category_slugs(id).await.unwrap(), vec!["news"]);

    db.delete_asset(id).await.unwrap();
    assert!(db.asset_category_slugs(id).await.unwrap().is_empty());
    // The category itself survives
    assert!(db.get_category_by_slug("news").await.unwrap().is_some());
}
