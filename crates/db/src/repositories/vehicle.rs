use crate::models::DbVehicle;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_vehicle_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbVehicle>> {
    let vehicle = sqlx::query_as::<_, DbVehicle>(
        r#"
        SELECT id, owner_email, make, model, license_plate, created_at
        FROM vehicles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(vehicle)
}
