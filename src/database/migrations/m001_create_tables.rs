use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // (project_id, position) is not unique: reorders rewrite positions one row at a time.
        manager
            .create_table(
                Table::create()
                    .table(ProjectRows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectRows::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectRows::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(ProjectRows::Type)
                            .string()
                            .not_null()
                            .default("row"),
                    )
                    .col(ColumnDef::new(ProjectRows::Position).integer().not_null())
                    .col(
                        ColumnDef::new(ProjectRows::Counter)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::Instructions)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::Label)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::TotalStitches)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::IsLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::MakeModeStatus)
                            .string()
                            .not_null()
                            .default("not_started"),
                    )
                    .col(
                        ColumnDef::new(ProjectRows::MakeModeCounter)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ProjectRows::ImageUrl).string())
                    .col(ColumnDef::new(ProjectRows::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(ProjectRows::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_rows_project_id")
                            .from(ProjectRows::Table, ProjectRows::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_project_rows_project_position")
                    .table(ProjectRows::Table)
                    .col(ProjectRows::ProjectId)
                    .col(ProjectRows::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Plans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plans::Name).string().not_null())
                    .col(
                        ColumnDef::new(Plans::CanvasData)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Plans::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Plans::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Plans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectRows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectRows {
    Table,
    Id,
    ProjectId,
    Type,
    Position,
    Counter,
    Instructions,
    Label,
    TotalStitches,
    IsLocked,
    MakeModeStatus,
    MakeModeCounter,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Plans {
    Table,
    Id,
    Name,
    CanvasData,
    CreatedAt,
    UpdatedAt,
}
