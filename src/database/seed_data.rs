use anyhow::Result;
use sea_orm::*;
use tracing::info;

use crate::database::entities::{plans, projects};
use crate::rows::{NewRow, RowType};
use crate::store::{DbStore, RowStore};

pub const SAMPLE_PROJECT_NAME: &str = "Sample: Amigurumi Ball";

const SAMPLE_ROWS: &[(RowType, &str, &str, &str)] = &[
    (RowType::Divider, "Body", "", ""),
    (RowType::Row, "Round 1", "6 sc in magic ring", "6"),
    (RowType::Row, "Round 2", "inc in each st around", "12"),
    (RowType::Row, "Round 3", "(sc, inc) x 6", "18"),
    (RowType::Note, "Stuffing", "Start stuffing firmly before closing", ""),
    (RowType::Divider, "Closing", "", ""),
    (RowType::Row, "Round 4", "(sc, dec) x 6", "12"),
    (RowType::Row, "Round 5", "dec around", "6"),
];

/// Creates a sample project with a handful of rows and an empty plan.
pub async fn create_sample_project(store: &DbStore) -> Result<()> {
    let db = store.connection();

    let existing_project = projects::Entity::find()
        .filter(projects::Column::Name.eq(SAMPLE_PROJECT_NAME))
        .one(db)
        .await?;

    if existing_project.is_some() {
        info!("Sample project already exists, skipping seed data creation");
        return Ok(());
    }

    info!("Creating sample project: {}", SAMPLE_PROJECT_NAME);
    let project = store.create_project(SAMPLE_PROJECT_NAME).await?;

    for (index, (row_type, label, instructions, total_stitches)) in SAMPLE_ROWS.iter().enumerate() {
        let mut row = NewRow::blank(project.id, *row_type, index as i32 + 1);
        row.label = label.to_string();
        row.instructions = instructions.to_string();
        row.total_stitches = total_stitches.to_string();
        store.insert_row(row).await?;
    }
    info!("Created {} rows for project {}", SAMPLE_ROWS.len(), project.id);

    let plan_exists = plans::Entity::find()
        .filter(plans::Column::Name.eq(SAMPLE_PROJECT_NAME))
        .one(db)
        .await?
        .is_some();
    if !plan_exists {
        let plan = store.create_plan(SAMPLE_PROJECT_NAME).await?;
        info!("Created sample plan {}", plan.id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = DbStore::new(setup_test_db().await);

        create_sample_project(&store).await.unwrap();
        create_sample_project(&store).await.unwrap();

        let projects = store.list_projects().await.unwrap();
        assert_eq!(projects.len(), 1);

        let rows = store.list_rows(projects[0].id).await.unwrap();
        assert_eq!(rows.len(), SAMPLE_ROWS.len());
        assert_eq!(rows[0].row_type, RowType::Divider);
        assert_eq!(rows[1].instructions, "6 sc in magic ring");
    }
}
