use std::sync::Arc;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::BookingStatus,
    error::Result,
    repository::{BookingRepository, RatingRepository, VenueRepository},
    scheduling,
};

#[derive(Debug, Serialize)]
pub struct OwnerStats {
    pub total_bookings: i64,
    pub total_revenue_cents: i64,
    pub average_rating: f64,
    /// Not yet computed; always 0.0. Callers must not rely on it.
    pub occupancy_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub booking_id: Uuid,
    pub venue_id: Uuid,
    pub status: BookingStatus,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub offset_percent: f64,
    pub width_percent: f64,
}

#[derive(Debug, Serialize)]
pub struct TodaySchedule {
    pub start_hour: u32,
    pub end_hour: u32,
    pub entries: Vec<TimelineEntry>,
}

pub struct AnalyticsService {
    booking_repo: Arc<dyn BookingRepository>,
    venue_repo: Arc<dyn VenueRepository>,
    rating_repo: Arc<dyn RatingRepository>,
}

impl AnalyticsService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        venue_repo: Arc<dyn VenueRepository>,
        rating_repo: Arc<dyn RatingRepository>,
    ) -> Self {
        Self {
            booking_repo,
            venue_repo,
            rating_repo,
        }
    }

    /// Booking count and revenue over the owner's Confirmed bookings in the
    /// range (current calendar month when none given), plus the unweighted
    /// mean rating across all of the owner's venues.
    pub async fn owner_stats(
        &self,
        owner_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<OwnerStats> {
        let (from, to) = range.unwrap_or_else(|| Self::current_month(Utc::now().date_naive()));

        let (total_bookings, total_revenue_cents) = self.booking_repo
            .confirmed_stats_for_owner(owner_id, from, to)
            .await?;

        let average_rating = self.rating_repo
            .average_for_owner(owner_id)
            .await?
            .map(|avg| (avg * 100.0).round() / 100.0)
            .unwrap_or(0.0);

        Ok(OwnerStats {
            total_bookings,
            total_revenue_cents,
            average_rating,
            occupancy_rate: 0.0,
        })
    }

    /// Today's non-cancelled bookings across the owner's venues, laid out
    /// against the earliest-open-to-latest-close window as percentage
    /// offsets for rendering. `None` when the owner has no venues.
    pub async fn today_schedule(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<TodaySchedule>> {
        let venues = self.venue_repo.list_by_owner(owner_id).await?;
        if venues.is_empty() {
            return Ok(None);
        }

        let window = scheduling::timeline_window(
            venues.iter().map(|v| (&v.open_time, &v.close_time)),
        );

        let bookings = self.booking_repo.list_today_for_owner(owner_id, today).await?;

        let entries = bookings
            .into_iter()
            .map(|b| {
                let (offset_percent, width_percent) = scheduling::timeline_position(
                    b.start_time,
                    b.duration_minutes(),
                    &window,
                );
                TimelineEntry {
                    booking_id: b.id,
                    venue_id: b.venue_id,
                    status: b.status,
                    start_time: b.start_time,
                    end_time: b.end_time,
                    offset_percent,
                    width_percent,
                }
            })
            .collect();

        Ok(Some(TodaySchedule {
            start_hour: window.start_hour,
            end_hour: window.end_hour,
            entries,
        }))
    }

    fn current_month(today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = today.with_day(1).unwrap_or(today);
        let to = if from.month() == 12 {
            NaiveDate::from_ymd_opt(from.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(from.year(), from.month() + 1, 1)
        }
        .map(|next| next - Duration::days(1))
        .unwrap_or(today);
        (from, to)
    }
}
