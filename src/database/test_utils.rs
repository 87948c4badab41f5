use sea_orm::{Database, DatabaseConnection};

use crate::rows::{NewRow, RowType};
use crate::store::{DbStore, RowStore};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    super::setup_database(&db)
        .await
        .expect("Failed to run migrations");

    db
}

/// Store with one project holding blank entries of `types` at positions 1..N.
pub async fn store_with_rows(project_name: &str, types: &[RowType]) -> (DbStore, i32, Vec<String>) {
    let store = DbStore::new(setup_test_db().await);
    let project = store
        .create_project(project_name)
        .await
        .expect("Failed to create project");

    let mut ids = Vec::new();
    for (index, row_type) in types.iter().enumerate() {
        let row = store
            .insert_row(NewRow::blank(project.id, *row_type, index as i32 + 1))
            .await
            .expect("Failed to insert row");
        ids.push(row.id);
    }

    (store, project.id, ids)
}
