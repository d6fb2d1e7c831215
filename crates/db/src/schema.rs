use chrono::NaiveTime;
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create slot_definitions table (the daily slot catalog)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slot_definitions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            start_time TIME NOT NULL UNIQUE,
            quota INTEGER NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create service_types table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS service_types (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create branches table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS branches (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL UNIQUE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create vehicles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            owner_email VARCHAR(255) NOT NULL,
            make VARCHAR(255) NOT NULL,
            model VARCHAR(255) NOT NULL,
            license_plate VARCHAR(32) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_email VARCHAR(255) NOT NULL,
            customer_name VARCHAR(255) NOT NULL,
            service_type_id UUID NOT NULL REFERENCES service_types(id),
            vehicle_id UUID NOT NULL REFERENCES vehicles(id),
            branch_id UUID NOT NULL REFERENCES branches(id),
            appointment_at TIMESTAMP NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('scheduled', 'cancelled')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_bookings_appointment_at ON bookings(appointment_at);
        CREATE INDEX IF NOT EXISTS idx_bookings_customer_email ON bookings(customer_email);
        CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);
        CREATE INDEX IF NOT EXISTS idx_vehicles_owner_email ON vehicles(owner_email);
        CREATE INDEX IF NOT EXISTS idx_slot_definitions_start_time ON slot_definitions(start_time);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}

/// Seeds the business-hours slot catalog. Quotas are left null so the
/// per-slot default applies until an administrator sets one. Idempotent.
pub async fn seed_slot_catalog(pool: &Pool<Postgres>) -> Result<()> {
    info!("Seeding slot catalog...");

    for hour in 8..=17u32 {
        let start_time = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| eyre!("invalid catalog hour: {hour}"))?;

        sqlx::query(
            r#"
            INSERT INTO slot_definitions (start_time, quota)
            VALUES ($1, NULL)
            ON CONFLICT (start_time) DO NOTHING
            "#,
        )
        .bind(start_time)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Seeds the read-only service-type and branch reference rows. Idempotent.
pub async fn seed_reference_data(pool: &Pool<Postgres>) -> Result<()> {
    info!("Seeding reference data...");

    for name in ["Inspection", "Oil Change", "Tire Change", "General Repair"] {
        sqlx::query(
            r#"
            INSERT INTO service_types (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    for name in ["Downtown", "Airport", "Riverside"] {
        sqlx::query(
            r#"
            INSERT INTO branches (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .execute(pool)
        .await?;
    }

    Ok(())
}
