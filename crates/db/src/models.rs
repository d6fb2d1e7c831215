use autocrm_core::models::booking::BookingStatus;
use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotDefinition {
    pub id: Uuid,
    pub start_time: NaiveTime,
    pub quota: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbVehicle {
    pub id: Uuid,
    pub owner_email: String,
    pub make: String,
    pub model: String,
    pub license_plate: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServiceType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBranch {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub service_type_id: Uuid,
    pub vehicle_id: Uuid,
    pub branch_id: Uuid,
    pub appointment_at: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking row joined with its service-type and vehicle reference data,
/// as returned by the customer booking listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBookingDetails {
    pub id: Uuid,
    pub customer_name: String,
    pub appointment_at: NaiveDateTime,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub service_type: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_license_plate: String,
    pub created_at: DateTime<Utc>,
}

/// Count of capacity-occupying bookings for one slot time on one date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlotBookedCount {
    pub slot_time: NaiveTime,
    pub booked: i64,
}
