use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown booking status: {0}")]
pub struct InvalidBookingStatus(pub String);

/// Lifecycle of a booking. `Scheduled` is the only state that counts toward
/// slot capacity; `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Scheduled,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = InvalidBookingStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "scheduled" => Ok(BookingStatus::Scheduled),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(InvalidBookingStatus(value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_email: String,
    pub customer_name: String,
    pub service_type_id: Uuid,
    pub vehicle_id: Uuid,
    pub branch_id: Uuid,
    pub appointment_at: NaiveDateTime,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/bookings`. Every field is required; they are optional
/// here so that a missing one surfaces as a validation error instead of a
/// body-rejection, and `date`/`time` are kept as strings so malformed values
/// land in the same error class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub vehicle_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub success: bool,
}

/// One row of `GET /api/bookings`: the booking joined with its service-type
/// and vehicle reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSummary {
    pub id: Uuid,
    pub customer_name: String,
    pub appointment_at: NaiveDateTime,
    pub status: BookingStatus,
    pub service_type: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_license_plate: String,
    pub created_at: DateTime<Utc>,
}
