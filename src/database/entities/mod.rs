pub mod plans;
pub mod project_rows;
pub mod projects;

pub use plans::Entity as Plans;
pub use project_rows::Entity as ProjectRows;
pub use projects::Entity as Projects;
