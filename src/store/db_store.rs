use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{CanvasStore, RowStore};
use crate::canvas::CanvasElement;
use crate::database::entities::{plans, project_rows, projects};
use crate::errors::{CanvasError, CanvasResult, CoreError, CoreResult, RowError, RowResult};
use crate::rows::{MakeModeStatus, NewRow, ProjectRow, RowPatch};

/// SQLite-backed store for rows, projects and plan canvases.
#[derive(Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn create_project(&self, name: &str) -> CoreResult<projects::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Project name cannot be empty"));
        }

        let existing = projects::Entity::find()
            .filter(projects::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CoreError::conflict(format!("Project '{}' already exists", name)));
        }

        let now = Utc::now();
        let project = projects::ActiveModel {
            id: ActiveValue::NotSet,
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        project
            .insert(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Failed to create project: {}", e)))
    }

    pub async fn list_projects(&self) -> CoreResult<Vec<projects::Model>> {
        Ok(projects::Entity::find()
            .order_by_asc(projects::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create_plan(&self, name: &str) -> CoreResult<plans::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::validation("Plan name cannot be empty"));
        }

        let now = Utc::now();
        let plan = plans::ActiveModel {
            id: ActiveValue::NotSet,
            name: Set(name.to_string()),
            canvas_data: Set("[]".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        plan.insert(&self.db)
            .await
            .map_err(|e| CoreError::internal(format!("Failed to create plan: {}", e)))
    }
}

#[async_trait]
impl RowStore for DbStore {
    async fn list_rows(&self, project_id: i32) -> RowResult<Vec<ProjectRow>> {
        let models = project_rows::Entity::find()
            .filter(project_rows::Column::ProjectId.eq(project_id))
            .order_by_asc(project_rows::Column::Position)
            .all(&self.db)
            .await?;

        models.into_iter().map(ProjectRow::try_from).collect()
    }

    async fn get_row(&self, id: &str) -> RowResult<ProjectRow> {
        let model = project_rows::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| RowError::NotFound(id.to_string()))?;

        ProjectRow::try_from(model)
    }

    async fn insert_row(&self, row: NewRow) -> RowResult<ProjectRow> {
        projects::Entity::find_by_id(row.project_id)
            .one(&self.db)
            .await?
            .ok_or(RowError::ProjectNotFound(row.project_id))?;

        let now = Utc::now();
        let model = project_rows::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            project_id: Set(row.project_id),
            row_type: Set(row.row_type.as_str().to_string()),
            position: Set(row.position),
            counter: Set(row.counter),
            instructions: Set(row.instructions),
            label: Set(row.label),
            total_stitches: Set(row.total_stitches),
            is_locked: Set(false),
            make_mode_status: Set(MakeModeStatus::NotStarted.as_str().to_string()),
            make_mode_counter: Set(0),
            image_url: Set(row.image_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&self.db).await?;
        debug!("Inserted row {} at position {}", created.id, created.position);
        ProjectRow::try_from(created)
    }

    async fn update_row(&self, id: &str, patch: RowPatch) -> RowResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut active = project_rows::ActiveModel {
            id: ActiveValue::Unchanged(id.to_string()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Some(position) = patch.position {
            active.position = Set(position);
        }
        if let Some(counter) = patch.counter {
            active.counter = Set(counter);
        }
        if let Some(instructions) = patch.instructions {
            active.instructions = Set(instructions);
        }
        if let Some(label) = patch.label {
            active.label = Set(label);
        }
        if let Some(total_stitches) = patch.total_stitches {
            active.total_stitches = Set(total_stitches);
        }
        if let Some(is_locked) = patch.is_locked {
            active.is_locked = Set(is_locked);
        }
        if let Some(status) = patch.make_mode_status {
            active.make_mode_status = Set(status.as_str().to_string());
        }
        if let Some(counter) = patch.make_mode_counter {
            active.make_mode_counter = Set(counter);
        }
        if let Some(image_url) = patch.image_url {
            active.image_url = Set(image_url);
        }

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                Err(RowError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_row(&self, id: &str) -> RowResult<()> {
        let result = project_rows::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RowError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CanvasStore for DbStore {
    async fn load_canvas(&self, plan_id: i32) -> CanvasResult<Vec<CanvasElement>> {
        let plan = plans::Entity::find_by_id(plan_id)
            .one(&self.db)
            .await?
            .ok_or(CanvasError::PlanNotFound(plan_id))?;

        if plan.canvas_data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&plan.canvas_data)?)
    }

    async fn save_canvas(&self, plan_id: i32, elements: &[CanvasElement]) -> CanvasResult<()> {
        let canvas_data = serde_json::to_string(elements)?;

        let active = plans::ActiveModel {
            id: ActiveValue::Unchanged(plan_id),
            canvas_data: Set(canvas_data),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) | Err(DbErr::RecordNotFound(_)) => {
                Err(CanvasError::PlanNotFound(plan_id))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_db;
    use crate::rows::RowType;

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let store = DbStore::new(setup_test_db().await);
        let project = store.create_project("Amigurumi fox").await.unwrap();

        let mut new_row = NewRow::blank(project.id, RowType::Row, 1);
        new_row.instructions = "6 sc in magic ring".to_string();
        let row = store.insert_row(new_row).await.unwrap();

        store
            .update_row(
                &row.id,
                RowPatch {
                    counter: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = store.get_row(&row.id).await.unwrap();
        assert_eq!(stored.counter, 4);
        assert_eq!(stored.instructions, "6 sc in magic ring");
        assert_eq!(stored.make_mode_status, MakeModeStatus::NotStarted);
    }

    #[tokio::test]
    async fn test_duplicate_project_name_conflicts() {
        let store = DbStore::new(setup_test_db().await);
        store.create_project("Tea cosy").await.unwrap();

        let err = store.create_project("  Tea cosy ").await.unwrap_err();
        assert_eq!(err.kind(), crate::errors::CoreErrorKind::Conflict);
        assert_eq!(store.list_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let store = DbStore::new(setup_test_db().await);
        let err = store
            .update_row("nope", RowPatch::position(3))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = store.delete_row("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_insert_into_missing_project() {
        let store = DbStore::new(setup_test_db().await);
        let err = store
            .insert_row(NewRow::blank(99, RowType::Note, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, RowError::ProjectNotFound(99)));
    }

    #[tokio::test]
    async fn test_canvas_round_trip_replaces_collection() {
        let store = DbStore::new(setup_test_db().await);
        let plan = store.create_plan("Blanket layout").await.unwrap();
        assert!(store.load_canvas(plan.id).await.unwrap().is_empty());

        let first = vec![CanvasElement::new(
            "text",
            "Border",
            crate::canvas::Point::new(1.0, 2.0),
        )];
        store.save_canvas(plan.id, &first).await.unwrap();

        let second = vec![
            CanvasElement::new("text", "Center", crate::canvas::Point::new(3.0, 4.0)),
            CanvasElement::new("image", "https://img/x.png", crate::canvas::Point::default()),
        ];
        store.save_canvas(plan.id, &second).await.unwrap();

        let loaded = store.load_canvas(plan.id).await.unwrap();
        assert_eq!(loaded, second);
    }

    #[tokio::test]
    async fn test_save_canvas_unknown_plan() {
        let store = DbStore::new(setup_test_db().await);
        let err = store.save_canvas(41, &[]).await.unwrap_err();
        assert!(matches!(err, CanvasError::PlanNotFound(41)));
    }
}
