//! Persistence collaborator used by the row engine and the canvas auto-saver.
//!
//! The engines only depend on these traits; `DbStore` is the SQLite-backed
//! implementation.

mod db_store;

use async_trait::async_trait;

use crate::canvas::CanvasElement;
use crate::errors::{CanvasResult, RowResult};
use crate::rows::{NewRow, ProjectRow, RowPatch};

pub use db_store::DbStore;

#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows of a project ordered by position.
    async fn list_rows(&self, project_id: i32) -> RowResult<Vec<ProjectRow>>;

    async fn get_row(&self, id: &str) -> RowResult<ProjectRow>;

    async fn insert_row(&self, row: NewRow) -> RowResult<ProjectRow>;

    /// Writes only the fields set in `patch`.
    async fn update_row(&self, id: &str, patch: RowPatch) -> RowResult<()>;

    async fn delete_row(&self, id: &str) -> RowResult<()>;
}

#[async_trait]
pub trait CanvasStore: Send + Sync {
    async fn load_canvas(&self, plan_id: i32) -> CanvasResult<Vec<CanvasElement>>;

    /// Replaces the plan's whole element collection.
    async fn save_canvas(&self, plan_id: i32, elements: &[CanvasElement]) -> CanvasResult<()>;
}
