//! Past days merged in front of the forecast to form the dashboard timeline.

use chrono::{Duration, Local, NaiveDate, Utc};

use crate::provider::WeatherProvider;
use crate::types::{DayForecast, EntrySource, FetchError, LocationQuery, TimelineEntry};

/// Calendar anchors for one timeline.
///
/// History requests count back from the UTC date; the today marker follows
/// the local calendar, so the two differ around midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineDates {
    pub history_from: NaiveDate,
    pub today: NaiveDate,
}

impl TimelineDates {
    pub fn now() -> Self {
        Self {
            history_from: Utc::now().date_naive(),
            today: Local::now().date_naive(),
        }
    }

    /// Both anchors pinned to one date
    pub fn fixed(date: NaiveDate) -> Self {
        Self {
            history_from: date,
            today: date,
        }
    }
}

/// Dates for the history requests, most recent first (`today - 1` .. `today - n`).
pub fn history_dates(today: NaiveDate, days: u8) -> Vec<NaiveDate> {
    (1..=i64::from(days))
        .map(|offset| today - Duration::days(offset))
        .collect()
}

/// Merge history results (most recent first, as fetched) with forecast days.
///
/// Failed history days are dropped. The result is in ascending date order
/// with each date appearing once: a history day that overlaps the forecast
/// is discarded in favour of the forecast.
pub fn merge_timeline(
    history: Vec<Result<DayForecast, FetchError>>,
    forecast: &[DayForecast],
    today: NaiveDate,
) -> Vec<TimelineEntry> {
    let first_forecast = forecast.first().map(|d| d.date);

    let mut past: Vec<DayForecast> = history
        .into_iter()
        .filter_map(|result| match result {
            Ok(day) => Some(day),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping history day");
                None
            }
        })
        .filter(|day| first_forecast.map_or(true, |first| day.date < first))
        .collect();
    past.sort_by_key(|d| d.date);
    past.dedup_by_key(|d| d.date);

    past.into_iter()
        .map(|day| TimelineEntry::from_day(day, EntrySource::History, today))
        .chain(
            forecast
                .iter()
                .cloned()
                .map(|day| TimelineEntry::from_day(day, EntrySource::Forecast, today)),
        )
        .collect()
}

/// Fetch `days` past days one after another and merge them with `forecast`.
///
/// Individual history failures never fail the timeline.
pub async fn build_timeline(
    provider: &WeatherProvider,
    query: &LocationQuery,
    forecast: &[DayForecast],
    dates: TimelineDates,
    days: u8,
) -> Vec<TimelineEntry> {
    let mut history = Vec::with_capacity(usize::from(days));
    for date in history_dates(dates.history_from, days) {
        history.push(provider.fetch_history_day(query, date).await);
    }

    let fetched = history.iter().filter(|r| r.is_ok()).count();
    tracing::debug!(requested = days, fetched, "History fetched");

    merge_timeline(history, forecast, dates.today)
}
