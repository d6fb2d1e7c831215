use crate::models::DbSlotDefinition;
use chrono::NaiveTime;
use eyre::Result;
use sqlx::{Pool, Postgres};

/// The full slot catalog, ascending by start time. Callers rely on this
/// ordering when presenting the daily schedule.
pub async fn list_slot_definitions(pool: &Pool<Postgres>) -> Result<Vec<DbSlotDefinition>> {
    let slots = sqlx::query_as::<_, DbSlotDefinition>(
        r#"
        SELECT id, start_time, quota, created_at
        FROM slot_definitions
        ORDER BY start_time ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(slots)
}

/// Exact time-of-day match. A missing entry is not an error; the caller
/// applies the default quota policy.
pub async fn get_slot_definition_by_time(
    pool: &Pool<Postgres>,
    start_time: NaiveTime,
) -> Result<Option<DbSlotDefinition>> {
    let slot = sqlx::query_as::<_, DbSlotDefinition>(
        r#"
        SELECT id, start_time, quota, created_at
        FROM slot_definitions
        WHERE start_time = $1
        "#,
    )
    .bind(start_time)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}
