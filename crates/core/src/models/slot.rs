use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Quota applied to a catalog slot whose stored quota is null or non-positive.
/// The fallback is resolved per slot at read time; stored values are never
/// rewritten.
pub const DEFAULT_SLOT_QUOTA: i32 = 20;

/// Remaining capacity of one catalog slot on one date. Derived data: always
/// recomputed from the current booking rows, never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub slot_time: String,
    pub is_available: bool,
    pub remaining_quota: i64,
}

/// The single quota-fallback authority. The availability resolver and the
/// booking admission path must agree on the effective quota for identical
/// inputs, so both go through here.
pub fn effective_quota(stored: Option<i32>) -> i32 {
    match stored {
        Some(quota) if quota > 0 => quota,
        _ => DEFAULT_SLOT_QUOTA,
    }
}

/// Slots are only offered Monday through Friday. Weekends never offer slots,
/// regardless of catalog contents.
pub fn is_operating_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Wire format for slot times is HH:MM, minute granularity.
pub fn format_slot_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn parse_slot_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub fn parse_slot_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
