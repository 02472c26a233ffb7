//! Pure slot arithmetic: discretizing a venue's opening hours into a grid,
//! marking the grid against existing bookings, and laying bookings out on
//! the owner dashboard timeline. No I/O; everything here is synchronous and
//! side-effect free.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus};

/// One bookable half-open interval `[start, end)` on the slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A grid slot with its availability verdict. `booking_id`/`booking_status`
/// are set when a confirmed or blocked booking occupies the slot, so the
/// owner manage view can offer release actions.
#[derive(Debug, Clone, Serialize)]
pub struct SlotAvailability {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub available: bool,
    pub booking_id: Option<Uuid>,
    pub booking_status: Option<BookingStatus>,
}

/// Discretize `[open, close)` into consecutive slots of `slot_minutes`.
/// A trailing remainder shorter than one slot is dropped, so every returned
/// slot is exactly `slot_minutes` long. Returns an empty grid when either
/// bound is unset or the window is empty.
pub fn slot_grid(
    open: Option<NaiveTime>,
    close: Option<NaiveTime>,
    slot_minutes: i64,
) -> Vec<Slot> {
    let (open, close) = match (open, close) {
        (Some(o), Some(c)) => (o, c),
        _ => return Vec::new(),
    };
    if slot_minutes <= 0 {
        return Vec::new();
    }

    let open_min = minutes_from_midnight(open);
    let close_min = minutes_from_midnight(close);

    let mut slots = Vec::new();
    let mut start = open_min;
    while start + slot_minutes <= close_min {
        let end = start + slot_minutes;
        slots.push(Slot {
            start: time_from_minutes(start),
            end: time_from_minutes(end),
        });
        start = end;
    }
    slots
}

/// Mark each grid slot against the day's bookings. A slot is available iff
/// no `Confirmed` or `Blocked` booking overlaps it and its start is not
/// more than `grace_minutes` in the past (which also rules out every slot
/// on an already-elapsed date).
pub fn mark_availability(
    slots: &[Slot],
    bookings: &[Booking],
    target_date: NaiveDate,
    now: NaiveDateTime,
    grace_minutes: i64,
) -> Vec<SlotAvailability> {
    let occupying: Vec<&Booking> = bookings
        .iter()
        .filter(|b| matches!(b.status, BookingStatus::Confirmed | BookingStatus::Blocked))
        .collect();

    let cutoff = now - Duration::minutes(grace_minutes);

    slots
        .iter()
        .map(|slot| {
            let occupant = occupying
                .iter()
                .find(|b| overlaps(slot.start, slot.end, b));
            let is_past = target_date.and_time(slot.start) < cutoff;

            SlotAvailability {
                start: slot.start,
                end: slot.end,
                available: occupant.is_none() && !is_past,
                booking_id: occupant.map(|b| b.id),
                booking_status: occupant.map(|b| b.status),
            }
        })
        .collect()
}

/// Half-open interval overlap between a proposed range and an existing
/// booking on the same venue and date.
pub fn overlaps(start: NaiveTime, end: NaiveTime, booking: &Booking) -> bool {
    booking.start_time < end && start < booking.end_time
}

/// The hour-aligned window spanned by a set of venue opening hours, for the
/// owner dashboard timeline. Opens floor to the hour, closes round up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimelineWindow {
    pub fn total_minutes(&self) -> i64 {
        (self.end_hour as i64 - self.start_hour as i64) * 60
    }
}

const DEFAULT_OPEN: u32 = 8;
const DEFAULT_CLOSE: u32 = 22;

/// Earliest open to latest close across the owner's venues, defaulting to
/// 08:00-22:00 when no venue declares hours.
pub fn timeline_window<'a, I>(hours: I) -> TimelineWindow
where
    I: IntoIterator<Item = (&'a Option<NaiveTime>, &'a Option<NaiveTime>)>,
{
    let mut min_open: Option<NaiveTime> = None;
    let mut max_close: Option<NaiveTime> = None;

    for (open, close) in hours {
        if let Some(o) = open {
            min_open = Some(min_open.map_or(*o, |m| m.min(*o)));
        }
        if let Some(c) = close {
            max_close = Some(max_close.map_or(*c, |m| m.max(*c)));
        }
    }

    let start_hour = min_open.map_or(DEFAULT_OPEN, |t| t.hour());
    let end_hour = max_close.map_or(DEFAULT_CLOSE, |t| {
        t.hour() + if t.minute() > 0 { 1 } else { 0 }
    });

    TimelineWindow { start_hour, end_hour }
}

/// Map a booking onto the timeline as `(offset_percent, width_percent)` by
/// linear interpolation. Degenerate windows collapse to zero.
pub fn timeline_position(
    start: NaiveTime,
    duration_minutes: i64,
    window: &TimelineWindow,
) -> (f64, f64) {
    let total = window.total_minutes();
    if total <= 0 {
        return (0.0, 0.0);
    }

    let start_offset =
        (start.hour() as i64 - window.start_hour as i64) * 60 + start.minute() as i64;
    let offset_percent = start_offset as f64 / total as f64 * 100.0;
    let width_percent = duration_minutes as f64 / total as f64 * 100.0;
    (offset_percent, width_percent)
}

/// Whether a proposed range sits on the slot grid: both endpoints aligned
/// to `slot_minutes` relative to midnight.
pub fn is_slot_aligned(start: NaiveTime, end: NaiveTime, slot_minutes: i64) -> bool {
    slot_minutes > 0
        && minutes_from_midnight(start) % slot_minutes == 0
        && minutes_from_midnight(end) % slot_minutes == 0
}

fn minutes_from_midnight(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64 / 60
}

fn time_from_minutes(minutes: i64) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt((minutes * 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}
