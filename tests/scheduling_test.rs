use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use turfbook::domain::{Booking, BookingStatus};
use turfbook::scheduling::{
    is_slot_aligned, mark_availability, slot_grid, timeline_position, timeline_window,
    TimelineWindow,
};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dt(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_time(t(h, m))
}

fn booking(date: NaiveDate, start: NaiveTime, end: NaiveTime, status: BookingStatus) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        venue_id: Uuid::new_v4(),
        player_id: Some(Uuid::new_v4()),
        date,
        start_time: start,
        end_time: end,
        status,
        block_reason: None,
        total_price_cents: 0,
        player_count: 1,
        idempotency_key: None,
        booked_at: now,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_slot_grid_full_day() {
    let slots = slot_grid(Some(t(8, 0)), Some(t(22, 0)), 30);

    // 14 hours of 30-minute slots
    assert_eq!(slots.len(), 28);
    assert_eq!(slots[0].start, t(8, 0));
    assert_eq!(slots[0].end, t(8, 30));
    assert_eq!(slots[27].start, t(21, 30));
    assert_eq!(slots[27].end, t(22, 0));

    // Every slot is exactly 30 minutes and they tile without gaps
    for pair in slots.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn test_slot_grid_drops_trailing_partial() {
    let slots = slot_grid(Some(t(9, 0)), Some(t(10, 15)), 30);

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].end, t(10, 0));
}

#[test]
fn test_slot_grid_unset_hours() {
    assert!(slot_grid(None, Some(t(22, 0)), 30).is_empty());
    assert!(slot_grid(Some(t(8, 0)), None, 30).is_empty());
    assert!(slot_grid(None, None, 30).is_empty());
}

#[test]
fn test_slot_grid_empty_window() {
    assert!(slot_grid(Some(t(22, 0)), Some(t(8, 0)), 30).is_empty());
    assert!(slot_grid(Some(t(8, 0)), Some(t(8, 0)), 30).is_empty());
}

#[test]
fn test_availability_marks_booked_slots() {
    // Venue open 08:00-22:00, one confirmed booking 10:00-11:00 on
    // 2024-06-01; viewed the day before, so nothing is in the past.
    let date = d(2024, 6, 1);
    let slots = slot_grid(Some(t(8, 0)), Some(t(22, 0)), 30);
    let bookings = vec![booking(date, t(10, 0), t(11, 0), BookingStatus::Confirmed)];
    let now = dt(d(2024, 5, 31), 12, 0);

    let marked = mark_availability(&slots, &bookings, date, now, 10);

    for slot in &marked {
        let expected_taken = slot.start == t(10, 0) || slot.start == t(10, 30);
        assert_eq!(slot.available, !expected_taken, "slot {}", slot.start);
        if expected_taken {
            assert_eq!(slot.booking_id, Some(bookings[0].id));
            assert_eq!(slot.booking_status, Some(BookingStatus::Confirmed));
        } else {
            assert!(slot.booking_id.is_none());
        }
    }
}

#[test]
fn test_availability_blocked_occupies_cancelled_does_not() {
    let date = d(2024, 6, 1);
    let slots = slot_grid(Some(t(8, 0)), Some(t(12, 0)), 30);
    let bookings = vec![
        booking(date, t(8, 0), t(9, 0), BookingStatus::Blocked),
        booking(date, t(9, 0), t(10, 0), BookingStatus::Cancelled),
    ];
    let now = dt(d(2024, 5, 31), 12, 0);

    let marked = mark_availability(&slots, &bookings, date, now, 10);

    assert!(!marked[0].available); // 08:00 blocked
    assert!(!marked[1].available); // 08:30 blocked
    assert!(marked[2].available); // 09:00 freed by cancellation
    assert!(marked[3].available); // 09:30
}

#[test]
fn test_availability_same_day_grace_window() {
    let date = d(2024, 6, 1);
    let slots = slot_grid(Some(t(8, 0)), Some(t(12, 0)), 30);
    let now = dt(date, 9, 5);

    let marked = mark_availability(&slots, &[], date, now, 10);

    // Cutoff is 08:55: the 09:00 slot is still on offer, and so is 09:30,
    // but everything starting 08:30 or earlier has lapsed.
    assert!(!marked[0].available); // 08:00
    assert!(!marked[1].available); // 08:30
    assert!(marked[2].available); // 09:00
    assert!(marked[3].available); // 09:30
}

#[test]
fn test_availability_grace_boundary_inclusive() {
    let date = d(2024, 6, 1);
    let slots = slot_grid(Some(t(9, 0)), Some(t(10, 0)), 30);
    // Exactly 10 minutes past the 09:00 start: still bookable.
    let now = dt(date, 9, 10);

    let marked = mark_availability(&slots, &[], date, now, 10);

    assert!(marked[0].available);
}

#[test]
fn test_availability_past_date_all_unavailable() {
    let date = d(2024, 6, 1);
    let slots = slot_grid(Some(t(8, 0)), Some(t(22, 0)), 30);
    let now = dt(d(2024, 6, 2), 0, 0);

    let marked = mark_availability(&slots, &[], date, now, 10);

    assert!(marked.iter().all(|s| !s.available));
}

#[test]
fn test_timeline_window_defaults() {
    let window = timeline_window(std::iter::empty());
    assert_eq!(window, TimelineWindow { start_hour: 8, end_hour: 22 });
}

#[test]
fn test_timeline_window_rounds_close_up() {
    let open = Some(t(7, 30));
    let close = Some(t(21, 30));
    let window = timeline_window(vec![(&open, &close)]);

    assert_eq!(window.start_hour, 7);
    assert_eq!(window.end_hour, 22);
}

#[test]
fn test_timeline_window_spans_venues() {
    let a = (Some(t(9, 0)), Some(t(18, 0)));
    let b = (Some(t(6, 0)), Some(t(23, 0)));
    let window = timeline_window(vec![(&a.0, &a.1), (&b.0, &b.1)]);

    assert_eq!(window.start_hour, 6);
    assert_eq!(window.end_hour, 23);
}

#[test]
fn test_timeline_position_interpolates() {
    let window = TimelineWindow { start_hour: 8, end_hour: 22 };
    // 840 minutes total; 10:00 is 120 minutes in.
    let (offset, width) = timeline_position(t(10, 0), 60, &window);

    assert!((offset - 120.0 / 840.0 * 100.0).abs() < 1e-9);
    assert!((width - 60.0 / 840.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_timeline_position_degenerate_window() {
    let window = TimelineWindow { start_hour: 8, end_hour: 8 };
    assert_eq!(timeline_position(t(8, 0), 60, &window), (0.0, 0.0));
}

#[test]
fn test_slot_alignment() {
    assert!(is_slot_aligned(t(10, 0), t(11, 30), 30));
    assert!(!is_slot_aligned(t(10, 15), t(11, 0), 30));
    assert!(!is_slot_aligned(t(10, 0), t(11, 10), 30));
}

#[test]
fn test_booking_is_completed_is_derived() {
    let date = d(2024, 6, 1);
    let b = booking(date, t(10, 0), t(11, 0), BookingStatus::Confirmed);

    assert!(!b.is_completed(dt(date, 10, 59)));
    assert!(b.is_completed(dt(date, 11, 0)));
    assert!(b.is_completed(dt(d(2024, 6, 2), 0, 0)));

    // Cancelled bookings never complete
    let c = booking(date, t(10, 0), t(11, 0), BookingStatus::Cancelled);
    assert!(!c.is_completed(dt(d(2024, 6, 2), 0, 0)));
}
