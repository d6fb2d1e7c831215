use crate::models::{DbBooking, DbBookingDetails, DbSlotBookedCount};
use autocrm_core::models::booking::BookingStatus;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Result of a write-time admission attempt.
#[derive(Debug)]
pub enum AdmissionOutcome {
    Admitted(DbBooking),
    CapacityExhausted { booked: i64, quota: i32 },
}

/// Scheduled-booking counts for one date, grouped by the slot time extracted
/// from the appointment timestamp. Cancelled rows never occupy capacity.
pub async fn booked_counts_for_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
) -> Result<Vec<DbSlotBookedCount>> {
    let counts = sqlx::query_as::<_, DbSlotBookedCount>(
        r#"
        SELECT CAST(appointment_at AS time) AS slot_time, COUNT(*) AS booked
        FROM bookings
        WHERE CAST(appointment_at AS date) = $1 AND status = $2
        GROUP BY slot_time
        "#,
    )
    .bind(date)
    .bind(BookingStatus::Scheduled.as_str())
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Scheduled-booking count for one exact (date, slot) appointment timestamp.
pub async fn count_scheduled_at(
    pool: &Pool<Postgres>,
    appointment_at: NaiveDateTime,
) -> Result<i64> {
    let booked = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE appointment_at = $1 AND status = $2
        "#,
    )
    .bind(appointment_at)
    .bind(BookingStatus::Scheduled.as_str())
    .fetch_one(pool)
    .await?;

    Ok(booked)
}

/// Admits a booking under a slot-scoped serialization lock.
///
/// The capacity check and the insert run in one transaction holding
/// `pg_advisory_xact_lock` keyed on the appointment timestamp, so two
/// concurrent admissions for the last remaining unit cannot both pass the
/// check: the loser blocks on the lock and then observes the winner's row.
/// The lock is released on commit or rollback; a failed insert leaves no
/// partial booking.
#[allow(clippy::too_many_arguments)]
pub async fn admit_booking(
    pool: &Pool<Postgres>,
    customer_email: &str,
    customer_name: &str,
    service_type_id: Uuid,
    vehicle_id: Uuid,
    branch_id: Uuid,
    appointment_at: NaiveDateTime,
    quota: i32,
) -> Result<AdmissionOutcome> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(appointment_at.format("%Y-%m-%d %H:%M").to_string())
        .execute(&mut *tx)
        .await?;

    let booked = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM bookings
        WHERE appointment_at = $1 AND status = $2
        "#,
    )
    .bind(appointment_at)
    .bind(BookingStatus::Scheduled.as_str())
    .fetch_one(&mut *tx)
    .await?;

    if booked >= i64::from(quota) {
        tx.rollback().await?;
        tracing::debug!(
            "Admission rejected at capacity: appointment_at={}, booked={}, quota={}",
            appointment_at,
            booked,
            quota
        );
        return Ok(AdmissionOutcome::CapacityExhausted { booked, quota });
    }

    let id = Uuid::new_v4();
    let now = Utc::now();

    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (
            id, customer_email, customer_name, service_type_id, vehicle_id,
            branch_id, appointment_at, status, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, customer_email, customer_name, service_type_id, vehicle_id,
                  branch_id, appointment_at, status, created_at
        "#,
    )
    .bind(id)
    .bind(customer_email)
    .bind(customer_name)
    .bind(service_type_id)
    .bind(vehicle_id)
    .bind(branch_id)
    .bind(appointment_at)
    .bind(BookingStatus::Scheduled.as_str())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!("Booking admitted: id={}, appointment_at={}", id, appointment_at);
    Ok(AdmissionOutcome::Admitted(booking))
}

/// Transitions a booking from Scheduled to Cancelled, conditioned on the row
/// existing, belonging to the caller, and currently being Scheduled. Returns
/// whether a row was updated; the caller cannot tell which condition failed.
pub async fn cancel_booking(
    pool: &Pool<Postgres>,
    id: Uuid,
    customer_email: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = $1
        WHERE id = $2 AND customer_email = $3 AND status = $4
        "#,
    )
    .bind(BookingStatus::Cancelled.as_str())
    .bind(id)
    .bind(customer_email)
    .bind(BookingStatus::Scheduled.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The caller's bookings joined with service-type and vehicle reference data,
/// newest appointment first.
pub async fn list_bookings_by_customer(
    pool: &Pool<Postgres>,
    customer_email: &str,
) -> Result<Vec<DbBookingDetails>> {
    let bookings = sqlx::query_as::<_, DbBookingDetails>(
        r#"
        SELECT b.id, b.customer_name, b.appointment_at, b.status, b.created_at,
               s.name AS service_type,
               v.make AS vehicle_make,
               v.model AS vehicle_model,
               v.license_plate AS vehicle_license_plate
        FROM bookings b
        JOIN service_types s ON s.id = b.service_type_id
        JOIN vehicles v ON v.id = b.vehicle_id
        WHERE b.customer_email = $1
        ORDER BY b.appointment_at DESC
        "#,
    )
    .bind(customer_email)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}
