use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatsCacheRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatsCacheRecords::CacheKey)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StatsCacheRecords::Payload)
                            .blob()
                            .not_null(),
                    )
                    .col(self.create_timestamp_column(manager, StatsCacheRecords::StoredAt))
                    .col(self.create_timestamp_column(manager, StatsCacheRecords::LastAccessed))
                    .col(ColumnDef::new(StatsCacheRecords::CommunityId).string())
                    .col(ColumnDef::new(StatsCacheRecords::PeriodYear).integer())
                    .col(
                        ColumnDef::new(StatsCacheRecords::DateBasis)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatsCacheRecords::Table).to_owned())
            .await
    }
}

impl Migration {
    // Timestamps are native on Postgres and ISO-8601 strings elsewhere
    fn create_timestamp_column(&self, manager: &SchemaManager, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        match manager.get_database_backend() {
            sea_orm::DatabaseBackend::Postgres => col.timestamp_with_time_zone().not_null(),
            _ => col.string().not_null(),
        };
        col
    }
}

#[derive(DeriveIden)]
pub enum StatsCacheRecords {
    Table,
    CacheKey,
    Payload,
    StoredAt,
    LastAccessed,
    CommunityId,
    PeriodYear,
    DateBasis,
}
