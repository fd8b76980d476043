use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveIden)]
enum Students {
    Table,
    StudentId,
    DrawNumber,
    IsSuspended,
    Gender,
    Department,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DrawItems {
    Table,
    Id,
    Name,
    WinnerQuota,
    WinnerCount,
    AllowDuplicateWinners,
    IsPublic,
    ShowRecentWinners,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DrawWinners {
    Table,
    Id,
    DrawItemId,
    StudentId,
    SelectedMode,
    IsForced,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DrawLiveEvents {
    Table,
    Id,
    Seq,
    DrawItemId,
    DrawItemName,
    WinnerStudentId,
    DrawMode,
    IsForced,
    IsPublic,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DrawSettings {
    Table,
    Id,
    LivePageEnabled,
    ShowRecentWinners,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Initial schema for the orientation event backend.
///
/// Notes
/// - `draw_items.winner_count` is a denormalized counter kept in lockstep with the
///   rows in `draw_winners`; the pick procedure bumps it under a row lock so the
///   quota check and the insert are one indivisible step.
/// - `draw_live_events.seq` is a bigserial; the spectator feed replays events in
///   ascending `seq` order and never updates or deletes rows.
/// - The partial unique index on `students.draw_number` allows any number of
///   NULLs while keeping assigned numbers unique.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::StudentId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::DrawNumber).string_len(4).null())
                    .col(
                        ColumnDef::new(Students::IsSuspended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Students::Gender)
                            .string_len(16)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Students::Department)
                            .string_len(64)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Students::Role)
                            .string_len(32)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // draw_number unique among assigned values only
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_students_draw_number_unique
                   ON students (draw_number) WHERE draw_number IS NOT NULL;"#
                    .to_string(),
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DrawItems::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(DrawItems::WinnerQuota)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(DrawItems::WinnerCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DrawItems::AllowDuplicateWinners)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DrawItems::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DrawItems::ShowRecentWinners)
                            .boolean()
                            .null(), // NULL = legacy row, treated as true
                    )
                    .col(
                        ColumnDef::new(DrawItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DrawItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(DrawItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                r#"ALTER TABLE draw_items
                   ADD CONSTRAINT chk_draw_items_quota CHECK (winner_quota >= 1),
                   ADD CONSTRAINT chk_draw_items_count CHECK (winner_count >= 0 AND winner_count <= winner_quota);"#
                    .to_string(),
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawWinners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawWinners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::DrawItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::StudentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::SelectedMode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::IsForced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::IsPublic)
                            .boolean()
                            .null(), // NULL = legacy row, treated as true
                    )
                    .col(
                        ColumnDef::new(DrawWinners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(DrawWinners::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // A student can never appear twice within the same item, forced or not.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_winners_item_student_unique")
                    .table(DrawWinners::Table)
                    .col(DrawWinners::DrawItemId)
                    .col(DrawWinners::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_winners_student")
                    .table(DrawWinners::Table)
                    .col(DrawWinners::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(DrawWinners::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_draw_winner_item")
                            .from_tbl(DrawWinners::Table)
                            .from_col(DrawWinners::DrawItemId)
                            .to_tbl(DrawItems::Table)
                            .to_col(DrawItems::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawLiveEvents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DrawLiveEvents::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(DrawLiveEvents::Seq)
                            .big_integer()
                            .not_null()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::DrawItemId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::DrawItemName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::WinnerStudentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::DrawMode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::IsForced)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DrawLiveEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_live_events_seq_unique")
                    .table(DrawLiveEvents::Table)
                    .col(DrawLiveEvents::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawSettings::LivePageEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DrawSettings::ShowRecentWinners)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(DrawSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // Singleton settings row, fixed key 1
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                r#"INSERT INTO draw_settings (id, live_page_enabled, show_recent_winners)
                   VALUES (1, FALSE, TRUE) ON CONFLICT (id) DO NOTHING;"#
                    .to_string(),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(DrawSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(DrawLiveEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(DrawWinners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(DrawItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Students::Table).to_owned())
            .await?;
        Ok(())
    }
}
