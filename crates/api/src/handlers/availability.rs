//! # Availability Handlers
//!
//! This module answers "what can I book on date D?". It resolves the daily
//! slot catalog against the bookings already admitted for that date and
//! reports the remaining capacity per slot.
//!
//! ## Resolution Algorithm
//!
//! 1. Reject requests without a valid calendar date
//! 2. Return an empty list for non-operating days (weekends) without touching
//!    the catalog; closed days offer no slots no matter what is configured
//! 3. Fetch the slot catalog ordered by start time and the scheduled-booking
//!    counts for the date, grouped by slot time
//! 4. For each catalog slot, resolve the effective quota (per-slot default
//!    when unset) and emit the remaining capacity
//!
//! Output ordering always follows the catalog (ascending start time), never
//! booked-count or availability. The endpoint is read-only; counts are
//! recomputed from current booking rows on every call.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use autocrm_core::{
    errors::CrmError,
    models::customer::CustomerIdentity,
    models::slot::{
        effective_quota, format_slot_time, is_operating_day, parse_slot_date, SlotAvailability,
    },
};
use chrono::NaiveTime;

use crate::{middleware::error_handling::AppError, ApiState};

/// Query parameters for the availability endpoint
///
/// # Fields
///
/// * `date` - Calendar date to resolve, `YYYY-MM-DD` (required)
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar date to resolve availability for
    pub date: Option<String>,
}

/// Resolves the open slots for one calendar date
///
/// # Endpoint
///
/// ```text
/// GET /api/availability?date=2024-06-10
/// ```
///
/// Requires a verified caller identity but does not filter results by it.
///
/// # Returns
///
/// * `Result<Json<Vec<SlotAvailability>>, AppError>` - one entry per catalog
///   slot in ascending start-time order; empty for non-operating days
///
/// # Errors
///
/// * `CrmError::Validation` - missing or malformed `date` parameter
/// * `CrmError::Database` - storage unavailable; no fallback data is synthesized
#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Extension(_identity): Extension<CustomerIdentity>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<SlotAvailability>>, AppError> {
    let date = query.date.as_deref().ok_or_else(|| {
        AppError(CrmError::Validation(
            "Missing required query parameter: date".to_string(),
        ))
    })?;

    let date = parse_slot_date(date).ok_or_else(|| {
        AppError(CrmError::Validation(
            "Invalid date format. Expected YYYY-MM-DD".to_string(),
        ))
    })?;

    // Closed days offer no slots, regardless of catalog contents. This is a
    // business rule, not a capacity condition.
    if !is_operating_day(date) {
        return Ok(Json(Vec::new()));
    }

    let catalog =
        autocrm_db::repositories::slot_catalog::list_slot_definitions(&state.db_pool)
            .await
            .map_err(CrmError::Database)?;

    let counts = autocrm_db::repositories::booking::booked_counts_for_date(&state.db_pool, date)
        .await
        .map_err(CrmError::Database)?;

    let booked_by_slot: HashMap<NaiveTime, i64> = counts
        .into_iter()
        .map(|count| (count.slot_time, count.booked))
        .collect();

    // Catalog order is the output order.
    let slots = catalog
        .into_iter()
        .map(|slot| {
            let quota = i64::from(effective_quota(slot.quota));
            let booked = booked_by_slot.get(&slot.start_time).copied().unwrap_or(0);
            let remaining = quota - booked;

            SlotAvailability {
                slot_time: format_slot_time(slot.start_time),
                is_available: remaining > 0,
                remaining_quota: remaining,
            }
        })
        .collect();

    Ok(Json(slots))
}
