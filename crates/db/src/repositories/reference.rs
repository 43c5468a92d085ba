use crate::models::{DbClinic, DbDirectorate};
use eyre::Result;
use rota_core::models::pharmacist::{Clinic, Directorate};
use sqlx::{Pool, Postgres};

pub async fn list_clinics(pool: &Pool<Postgres>) -> Result<Vec<Clinic>> {
    let rows = sqlx::query_as::<_, DbClinic>(
        r#"
        SELECT id, name, day_of_week, start_time, end_time
        FROM clinics
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Clinic::try_from).collect()
}

pub async fn list_directorates(pool: &Pool<Postgres>) -> Result<Vec<Directorate>> {
    let rows = sqlx::query_as::<_, DbDirectorate>(
        r#"
        SELECT id, name, wards
        FROM directorates
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Directorate::from).collect())
}
