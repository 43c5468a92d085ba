use crate::models::DbPharmacist;
use eyre::Result;
use rota_core::models::pharmacist::Pharmacist;
use sqlx::{Pool, Postgres};

pub async fn list_pharmacists(pool: &Pool<Postgres>) -> Result<Vec<Pharmacist>> {
    let rows = sqlx::query_as::<_, DbPharmacist>(
        r#"
        SELECT id, name, display_name, band, working_days, is_default_pharmacist,
               not_available_rules, created_at
        FROM pharmacists
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    tracing::debug!("Loaded {} pharmacists", rows.len());
    rows.into_iter().map(Pharmacist::try_from).collect()
}
