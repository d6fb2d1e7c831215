//! # Booking Handlers
//!
//! This module implements booking admission, cancellation, and the caller's
//! booking listing.
//!
//! ## Admission Algorithm
//!
//! Admission applies these steps in order, each short-circuiting on failure:
//!
//! 1. Validate that all five request fields are present and well-formed
//! 2. Resolve the slot quota from the catalog by exact time-of-day match,
//!    falling back to the per-slot default. This is the same policy the
//!    availability resolver uses, so both agree on effective quota
//! 3. Count existing Scheduled bookings for the same appointment timestamp
//!    and reject at capacity
//! 4. Verify the referenced vehicle exists and belongs to the caller
//! 5. Verify the service-type and branch references resolve
//! 6. Compose the customer display name from the verified identity
//! 7. Insert with status Scheduled under a slot-scoped lock that re-verifies
//!    the count, closing the check-then-act window between steps 3 and 7
//!
//! The capacity re-check happens at write time inside the admission
//! transaction; a client's earlier availability snapshot is never trusted.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use autocrm_core::{
    errors::CrmError,
    models::booking::{
        BookingSummary, CancelBookingResponse, CreateBookingRequest, CreateBookingResponse,
    },
    models::customer::CustomerIdentity,
    models::slot::{effective_quota, parse_slot_date, parse_slot_time},
};
use autocrm_db::repositories::booking::AdmissionOutcome;
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

fn missing_field(name: &str) -> AppError {
    AppError(CrmError::Validation(format!(
        "Missing required field: {name}"
    )))
}

/// Admits or rejects a booking request
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// ```
///
/// The customer identity comes from the verified-identity middleware, never
/// from the request body.
///
/// # Returns
///
/// * `201 Created` with the new booking id. The client is expected to
///   re-query availability if it needs the updated slot list.
///
/// # Errors
///
/// * `CrmError::Validation` - missing/malformed field, or unknown
///   service-type/branch reference
/// * `CrmError::Conflict` - slot at capacity (re-verified at write time)
/// * `CrmError::NotFound` - vehicle does not exist
/// * `CrmError::Authorization` - vehicle belongs to another customer
/// * `CrmError::Database` - storage failure; no partial booking is left behind
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Extension(identity): Extension<CustomerIdentity>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    // STEP 1: field validation. Nothing is inserted when any field is absent.
    let vehicle_id = payload.vehicle_id.ok_or_else(|| missing_field("vehicle_id"))?;
    let service_type_id = payload
        .service_type_id
        .ok_or_else(|| missing_field("service_type_id"))?;
    let branch_id = payload.branch_id.ok_or_else(|| missing_field("branch_id"))?;
    let date_raw = payload.date.as_deref().ok_or_else(|| missing_field("date"))?;
    let time_raw = payload.time.as_deref().ok_or_else(|| missing_field("time"))?;

    let date = parse_slot_date(date_raw).ok_or_else(|| {
        AppError(CrmError::Validation(
            "Invalid date format. Expected YYYY-MM-DD".to_string(),
        ))
    })?;
    let time = parse_slot_time(time_raw).ok_or_else(|| {
        AppError(CrmError::Validation(
            "Invalid time format. Expected HH:MM".to_string(),
        ))
    })?;

    let appointment_at = date.and_time(time);

    // STEP 2: effective quota by exact slot-time match, same fallback policy
    // as the availability resolver.
    let slot =
        autocrm_db::repositories::slot_catalog::get_slot_definition_by_time(&state.db_pool, time)
            .await
            .map_err(CrmError::Database)?;
    let quota = effective_quota(slot.and_then(|slot| slot.quota));

    // STEP 3: capacity check. The admission transaction re-verifies this
    // count under the slot lock before inserting.
    let booked =
        autocrm_db::repositories::booking::count_scheduled_at(&state.db_pool, appointment_at)
            .await
            .map_err(CrmError::Database)?;

    if booked >= i64::from(quota) {
        return Err(AppError(CrmError::Conflict(format!(
            "Slot {} on {} is fully booked",
            time_raw, date_raw
        ))));
    }

    // STEP 4: the vehicle must exist and belong to the caller. Checked before
    // insert even when capacity is available.
    let vehicle = autocrm_db::repositories::vehicle::get_vehicle_by_id(&state.db_pool, vehicle_id)
        .await
        .map_err(CrmError::Database)?
        .ok_or_else(|| CrmError::NotFound(format!("Vehicle with ID {} not found", vehicle_id)))?;

    if vehicle.owner_email != identity.email {
        return Err(AppError(CrmError::Authorization(
            "Vehicle does not belong to the requesting customer".to_string(),
        )));
    }

    // STEP 5: service-type and branch references must resolve.
    autocrm_db::repositories::reference::get_service_type_by_id(&state.db_pool, service_type_id)
        .await
        .map_err(CrmError::Database)?
        .ok_or_else(|| {
            CrmError::Validation(format!("Unknown service type: {}", service_type_id))
        })?;

    autocrm_db::repositories::reference::get_branch_by_id(&state.db_pool, branch_id)
        .await
        .map_err(CrmError::Database)?
        .ok_or_else(|| CrmError::Validation(format!("Unknown branch: {}", branch_id)))?;

    // STEP 6: compose the display name from the verified identity.
    let customer_name = identity.display_name();

    // STEP 7: transactional admission; creation timestamp is set by the
    // repository at admission time, never client-supplied.
    let outcome = autocrm_db::repositories::booking::admit_booking(
        &state.db_pool,
        &identity.email,
        &customer_name,
        service_type_id,
        vehicle_id,
        branch_id,
        appointment_at,
        quota,
    )
    .await
    .map_err(CrmError::Database)?;

    match outcome {
        AdmissionOutcome::Admitted(booking) => Ok((
            StatusCode::CREATED,
            Json(CreateBookingResponse {
                booking_id: booking.id,
            }),
        )),
        AdmissionOutcome::CapacityExhausted { .. } => Err(AppError(CrmError::Conflict(format!(
            "Slot {} on {} is fully booked",
            time_raw, date_raw
        )))),
    }
}

/// Cancels one of the caller's scheduled bookings
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings/:id/cancel
/// ```
///
/// The transition is a single conditional status update: the booking must
/// exist, belong to the caller, and currently be Scheduled. Which of those
/// conditions failed is not disclosed: a foreign booking and a missing one
/// produce the same not-found response. A cancelled booking immediately stops
/// counting toward slot capacity.
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Extension(identity): Extension<CustomerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let cancelled =
        autocrm_db::repositories::booking::cancel_booking(&state.db_pool, id, &identity.email)
            .await
            .map_err(CrmError::Database)?;

    if !cancelled {
        return Err(AppError(CrmError::NotFound(format!(
            "Booking with ID {} not found",
            id
        ))));
    }

    Ok(Json(CancelBookingResponse { success: true }))
}

/// Lists the caller's bookings, newest appointment first
///
/// # Endpoint
///
/// ```text
/// GET /api/bookings
/// ```
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    Extension(identity): Extension<CustomerIdentity>,
) -> Result<Json<Vec<BookingSummary>>, AppError> {
    let rows = autocrm_db::repositories::booking::list_bookings_by_customer(
        &state.db_pool,
        &identity.email,
    )
    .await
    .map_err(CrmError::Database)?;

    let bookings = rows
        .into_iter()
        .map(|row| BookingSummary {
            id: row.id,
            customer_name: row.customer_name,
            appointment_at: row.appointment_at,
            status: row.status,
            service_type: row.service_type,
            vehicle_make: row.vehicle_make,
            vehicle_model: row.vehicle_model,
            vehicle_license_plate: row.vehicle_license_plate,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(bookings))
}
