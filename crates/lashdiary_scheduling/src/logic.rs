// --- File: crates/lashdiary_scheduling/src/logic.rs ---
//! Slot normalization and conflict detection.
//!
//! Every equality comparison in the booking pipeline happens on the
//! canonical form: a business-zone `NaiveDate` plus a 24-hour
//! [`SlotTime`]. Human labels ("3:30 PM", admin-configured or
//! client-selected) are parsed into that form up front; any label or date
//! that does not parse rejects the request. There is no silent default
//! anywhere in this path.

use crate::models::{BookingStatus, Consultation, ConsultationStatus, ShowcaseBooking};
use chrono::{DateTime, LocalResult, NaiveDate, TimeZone};
use chrono_tz::Tz;
use lashdiary_common::{validation_error, SchedulingError};
use lashdiary_config::{AppConfig, BookingConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Canonical 24-hour wall-clock time of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotTime {
    pub hour: u8,
    pub minute: u8,
}

impl SlotTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, SchedulingError> {
        if hour > 23 || minute > 59 {
            return Err(validation_error(format!(
                "time {hour}:{minute:02} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Minutes since midnight; used for grid stepping.
    pub fn minutes_of_day(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }

    /// The 12-hour label presented to clients, e.g. `"3:30 PM"`.
    pub fn label_12h(&self) -> String {
        let meridiem = if self.hour < 12 { "AM" } else { "PM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour, self.minute, meridiem)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One bookable appointment window: business-zone date plus canonical
/// time. Conflict checks compare these, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub time: SlotTime,
}

/// Parse a human time label into canonical 24-hour components.
///
/// Accepted forms, tried in order:
/// 1. `H:MM AM|PM`: case-insensitive meridiem, optional space before it,
///    with `12 AM` mapping to hour 0 and `12 PM` staying 12.
/// 2. `H:MM` / `HH:MM`: 24-hour.
///
/// Anything else is a validation error. The upstream system guessed
/// `10:00` for unparseable labels, which could silently double-book an
/// unrelated slot; here the request fails instead.
pub fn parse_time_label(label: &str) -> Result<SlotTime, SchedulingError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(validation_error("time label is empty"));
    }

    let upper = trimmed.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (upper.as_str(), None)
    };

    let mut parts = clock.split(':');
    let (Some(hour_part), Some(minute_part), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(validation_error(format!(
            "time label {label:?} must be H:MM or H:MM AM/PM"
        )));
    };

    let hour: u8 = hour_part
        .trim()
        .parse()
        .map_err(|_| validation_error(format!("time label {label:?} has a non-numeric hour")))?;
    let minute: u8 = minute_part
        .trim()
        .parse()
        .map_err(|_| validation_error(format!("time label {label:?} has a non-numeric minute")))?;

    if minute > 59 {
        return Err(validation_error(format!(
            "time label {label:?} has minute {minute} out of range"
        )));
    }

    match meridiem {
        Some(m) => {
            if !(1..=12).contains(&hour) {
                return Err(validation_error(format!(
                    "12-hour label {label:?} must have hour 1-12"
                )));
            }
            let hour = match (hour, m) {
                (12, Meridiem::Am) => 0,
                (12, Meridiem::Pm) => 12,
                (h, Meridiem::Am) => h,
                (h, Meridiem::Pm) => h + 12,
            };
            SlotTime::new(hour, minute)
        }
        None => SlotTime::new(hour, minute),
    }
}

#[derive(Debug, Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a `YYYY-MM-DD` date string. The string must split into exactly
/// three numeric components forming a real calendar date; anything else is
/// a validation error, never a substituted default.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, SchedulingError> {
    let parts: Vec<&str> = value.trim().split('-').collect();
    if parts.len() != 3 {
        return Err(validation_error(format!(
            "date {value:?} must be YYYY-MM-DD"
        )));
    }
    let year: i32 = parts[0]
        .parse()
        .map_err(|_| validation_error(format!("date {value:?} has a non-numeric year")))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| validation_error(format!("date {value:?} has a non-numeric month")))?;
    let day: u32 = parts[2]
        .parse()
        .map_err(|_| validation_error(format!("date {value:?} has a non-numeric day")))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| validation_error(format!("date {value:?} is not a real calendar date")))
}

/// Combine a request's date and time label into a canonical slot key.
pub fn slot_key(date: &str, time_label: &str) -> Result<SlotKey, SchedulingError> {
    Ok(SlotKey {
        date: parse_calendar_date(date)?,
        time: parse_time_label(time_label)?,
    })
}

/// Anchor a slot key in the business timezone, producing an unambiguous
/// instant (ISO-8601 with explicit offset when formatted).
///
/// Nairobi has no DST, but the code does not assume that: a local time
/// that is ambiguous or nonexistent in the configured zone is rejected
/// like any other malformed input.
pub fn canonical_instant(
    date: NaiveDate,
    time: SlotTime,
    tz: Tz,
) -> Result<DateTime<Tz>, SchedulingError> {
    let naive = date
        .and_hms_opt(u32::from(time.hour), u32::from(time.minute), 0)
        .ok_or_else(|| validation_error(format!("time {time} is out of range")))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(..) => Err(validation_error(format!(
            "local time {naive} is ambiguous in {tz}"
        ))),
        LocalResult::None => Err(validation_error(format!(
            "local time {naive} does not exist in {tz}"
        ))),
    }
}

/// The configured business timezone.
pub fn business_tz(config: &AppConfig) -> Result<Tz, SchedulingError> {
    Tz::from_str(&config.booking.time_zone).map_err(|_| {
        SchedulingError::Config(format!(
            "unknown booking.time_zone: {}",
            config.booking.time_zone
        ))
    })
}

// --- Conflict Detection ---

/// Whether a stored consultation blocks the given slot. Cancelled records
/// never block. A stored label that no longer parses cannot equal any
/// canonical key; it is skipped with a warning rather than failing the
/// whole scan.
pub fn consultation_blocks(record: &Consultation, key: &SlotKey) -> bool {
    if record.status == ConsultationStatus::Cancelled {
        return false;
    }
    if record.preferred_date != key.date {
        return false;
    }
    match parse_time_label(&record.preferred_time) {
        Ok(time) => time == key.time,
        Err(_) => {
            warn!(
                id = %record.id,
                label = %record.preferred_time,
                "stored consultation time label does not parse; record cannot block"
            );
            false
        }
    }
}

/// Whether a stored showcase booking blocks the given slot. Pending
/// bookings block exactly like confirmed ones; only cancelled records free
/// the slot. The stored instant is reduced back to its business-zone
/// calendar date for comparison.
pub fn showcase_blocks(record: &ShowcaseBooking, key: &SlotKey, tz: Tz) -> bool {
    if record.status == BookingStatus::Cancelled {
        return false;
    }
    if record.appointment_date.with_timezone(&tz).date_naive() != key.date {
        return false;
    }
    match parse_time_label(&record.appointment_time) {
        Ok(time) => time == key.time,
        Err(_) => {
            warn!(
                id = %record.id,
                label = %record.appointment_time,
                "stored showcase time label does not parse; record cannot block"
            );
            false
        }
    }
}

/// Whether any non-cancelled record of either kind already holds the slot.
pub fn slot_taken(
    key: &SlotKey,
    consultations: &[Consultation],
    showcase: &[ShowcaseBooking],
    tz: Tz,
) -> bool {
    consultations.iter().any(|c| consultation_blocks(c, key))
        || showcase.iter().any(|b| showcase_blocks(b, key, tz))
}

// --- Availability Grid ---

/// The business-wide slot grid shared by both appointment kinds.
#[derive(Debug, Clone, Copy)]
pub struct TimeGrid {
    pub day_start: SlotTime,
    pub day_end: SlotTime,
    pub interval_minutes: u32,
}

impl TimeGrid {
    pub fn from_config(booking: &BookingConfig) -> Result<Self, SchedulingError> {
        let day_start = parse_time_label(&booking.day_start)?;
        let day_end = parse_time_label(&booking.day_end)?;
        if booking.slot_interval_minutes == 0 {
            return Err(SchedulingError::Config(
                "booking.slot_interval_minutes must be positive".to_string(),
            ));
        }
        Ok(Self {
            day_start,
            day_end,
            interval_minutes: booking.slot_interval_minutes,
        })
    }

    /// All slot start times of a business day; the last slot starts one
    /// interval before day end.
    pub fn slots(&self) -> Vec<SlotTime> {
        let mut slots = Vec::new();
        let mut minutes = self.day_start.minutes_of_day();
        let end = self.day_end.minutes_of_day();
        while minutes + self.interval_minutes <= end {
            slots.push(SlotTime {
                hour: (minutes / 60) as u8,
                minute: (minutes % 60) as u8,
            });
            minutes += self.interval_minutes;
        }
        slots
    }
}

/// The labels a client may still book for `date`: the day grid minus
/// taken slots, minus slots already in the past relative to `now`.
pub fn available_labels(
    date: NaiveDate,
    now: DateTime<Tz>,
    grid: &TimeGrid,
    consultations: &[Consultation],
    showcase: &[ShowcaseBooking],
    tz: Tz,
) -> Vec<String> {
    grid.slots()
        .into_iter()
        .filter(|slot| {
            let key = SlotKey { date, time: *slot };
            if slot_taken(&key, consultations, showcase, tz) {
                return false;
            }
            match canonical_instant(date, *slot, tz) {
                Ok(instant) => instant > now,
                Err(_) => false,
            }
        })
        .map(|slot| slot.label_12h())
        .collect()
}
