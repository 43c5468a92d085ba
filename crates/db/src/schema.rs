use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create pharmacists table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pharmacists (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            display_name VARCHAR(255) NULL,
            band VARCHAR(64) NOT NULL,
            working_days JSONB NOT NULL DEFAULT '[]'::jsonb,
            is_default_pharmacist BOOLEAN NOT NULL DEFAULT FALSE,
            not_available_rules JSONB NOT NULL DEFAULT '[]'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create clinics table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS clinics (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            day_of_week VARCHAR(16) NOT NULL,
            start_time TIME NOT NULL,
            end_time TIME NOT NULL,
            CONSTRAINT valid_clinic_range CHECK (end_time > start_time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create directorates table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS directorates (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            wards JSONB NOT NULL DEFAULT '[]'::jsonb
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create rotas table; assignments are stored in list order
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rotas (
            id UUID PRIMARY KEY,
            date DATE NOT NULL,
            week_start DATE NOT NULL,
            status VARCHAR(16) NOT NULL,
            assignments JSONB NOT NULL DEFAULT '[]'::jsonb,
            included_weekdays JSONB NULL,
            free_cell_text JSONB NOT NULL DEFAULT '{}'::jsonb,
            original_rota_id UUID NULL REFERENCES rotas(id) ON DELETE SET NULL,
            published_by VARCHAR(255) NULL,
            published_at TIMESTAMP WITH TIME ZONE NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_rota_status CHECK (status IN ('draft', 'published'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_rotas_status ON rotas(status)",
        "CREATE INDEX IF NOT EXISTS idx_rotas_week_start_status ON rotas(week_start, status)",
        "CREATE INDEX IF NOT EXISTS idx_rotas_date ON rotas(date)",
        "CREATE INDEX IF NOT EXISTS idx_rotas_original_rota_id ON rotas(original_rota_id)",
        "CREATE INDEX IF NOT EXISTS idx_clinics_day_of_week ON clinics(day_of_week)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
