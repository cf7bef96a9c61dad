use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Partitioned tables cannot be expressed through the schema
        // builder, so the parent table and its indexes are raw SQL.
        // Monthly partitions are created at runtime by the store.
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"
            CREATE TABLE IF NOT EXISTS game_logs (
                id UUID NOT NULL,
                "timestamp" TIMESTAMPTZ NOT NULL,
                level VARCHAR(16) NOT NULL,
                log_type VARCHAR(64) NOT NULL,
                message TEXT NOT NULL,
                resource VARCHAR(128),
                metadata JSONB,
                user_id BIGINT,
                PRIMARY KEY ("timestamp", id)
            ) PARTITION BY RANGE ("timestamp")
            "#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE INDEX IF NOT EXISTS idx_game_logs_timestamp ON game_logs ("timestamp")"#,
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_game_logs_log_type ON game_logs (log_type)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_game_logs_level ON game_logs (level)",
        )
        .await?;
        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_game_logs_resource ON game_logs (resource)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS game_logs CASCADE")
            .await?;
        Ok(())
    }
}
