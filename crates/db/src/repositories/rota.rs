use std::collections::BTreeMap;

use crate::models::DbRota;
use chrono::NaiveDate;
use eyre::Result;
use rota_core::models::{
    assignment::Assignment,
    rota::{Rota, RotaStatus},
};
use sqlx::{types::Json, PgConnection, Pool, Postgres};
use uuid::Uuid;

fn into_rotas(rows: Vec<DbRota>) -> Result<Vec<Rota>> {
    rows.into_iter().map(Rota::try_from).collect()
}

pub async fn list_rotas_by_status(pool: &Pool<Postgres>, status: RotaStatus) -> Result<Vec<Rota>> {
    let rows = sqlx::query_as::<_, DbRota>(
        r#"
        SELECT id, date, week_start, status, assignments, included_weekdays, free_cell_text,
               original_rota_id, published_by, published_at, created_at
        FROM rotas
        WHERE status = $1
        ORDER BY date ASC, created_at ASC
        "#,
    )
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;

    tracing::debug!("Loaded {} {} rotas", rows.len(), status.as_str());
    into_rotas(rows)
}

/// Loads a rota and holds its row lock until the transaction ends.
pub async fn lock_rota(conn: &mut PgConnection, id: Uuid) -> Result<Option<Rota>> {
    let row = sqlx::query_as::<_, DbRota>(
        r#"
        SELECT id, date, week_start, status, assignments, included_weekdays, free_cell_text,
               original_rota_id, published_by, published_at, created_at
        FROM rotas
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    row.map(Rota::try_from).transpose()
}

pub async fn lock_week_drafts(conn: &mut PgConnection, week_start: NaiveDate) -> Result<Vec<Rota>> {
    let rows = sqlx::query_as::<_, DbRota>(
        r#"
        SELECT id, date, week_start, status, assignments, included_weekdays, free_cell_text,
               original_rota_id, published_by, published_at, created_at
        FROM rotas
        WHERE week_start = $1 AND status = 'draft'
        ORDER BY date ASC, created_at ASC
        FOR UPDATE
        "#,
    )
    .bind(week_start)
    .fetch_all(conn)
    .await?;

    into_rotas(rows)
}

pub async fn insert_rota(conn: &mut PgConnection, rota: &Rota) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO rotas (id, date, week_start, status, assignments, included_weekdays,
                           free_cell_text, original_rota_id, published_by, published_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(rota.id)
    .bind(rota.date)
    .bind(rota.week_start)
    .bind(rota.status.as_str())
    .bind(Json(&rota.assignments))
    .bind(rota.included_weekdays.as_ref().map(Json))
    .bind(Json(&rota.free_cell_text))
    .bind(rota.original_rota_id)
    .bind(rota.published_by.as_deref())
    .bind(rota.published_at)
    .bind(rota.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn update_assignments(
    conn: &mut PgConnection,
    id: Uuid,
    assignments: &[Assignment],
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE rotas
        SET assignments = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Json(assignments))
    .execute(conn)
    .await?;

    Ok(())
}

/// Returns false when no rota has the given id.
pub async fn update_free_cell_text(
    pool: &Pool<Postgres>,
    id: Uuid,
    free_cell_text: &BTreeMap<String, String>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE rotas
        SET free_cell_text = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Json(free_cell_text))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_week_drafts(conn: &mut PgConnection, week_start: NaiveDate) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM rotas
        WHERE week_start = $1 AND status = 'draft'
        "#,
    )
    .bind(week_start)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
