use crate::models::{DbBranch, DbServiceType};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_service_type_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbServiceType>> {
    let service_type = sqlx::query_as::<_, DbServiceType>(
        r#"
        SELECT id, name, created_at
        FROM service_types
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service_type)
}

pub async fn get_branch_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbBranch>> {
    let branch = sqlx::query_as::<_, DbBranch>(
        r#"
        SELECT id, name, created_at
        FROM branches
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(branch)
}
