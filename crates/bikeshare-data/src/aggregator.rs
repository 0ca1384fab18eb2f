//! The four statistics sections computed over a [`FilteredTable`].
//!
//! Each section scans the table independently and never mutates it. Every
//! "most common" value uses a stable mode: ties go to the value seen first in
//! table order.

use bikeshare_core::calculations::{min_max, mode, sum_and_mean, value_counts};
use bikeshare_core::models::{
    CalendarMonth, CitySchema, DemographicStats, Demographics, DurationStats, StationStats,
    TemporalStats, UserStats,
};

use crate::filter::FilteredTable;

// ── TripAggregator ────────────────────────────────────────────────────────────

/// Stateless helper computing each report section.
pub struct TripAggregator;

impl TripAggregator {
    /// Most common month, day of week and start hour.
    pub fn temporal_stats(table: &FilteredTable<'_>) -> TemporalStats {
        TemporalStats {
            most_common_month: mode(table.iter().map(|r| r.month))
                .and_then(CalendarMonth::from_number),
            most_common_day: mode(table.iter().map(|r| r.weekday)),
            most_common_hour: mode(table.iter().map(|r| r.hour)),
        }
    }

    /// Most common start station, end station and start/end combination.
    pub fn station_stats(table: &FilteredTable<'_>) -> StationStats {
        StationStats {
            most_common_start_station: mode(table.iter().map(|r| r.trip.start_station.as_str()))
                .map(str::to_string),
            most_common_end_station: mode(table.iter().map(|r| r.trip.end_station.as_str()))
                .map(str::to_string),
            most_common_trip: mode(table.iter().map(|r| r.station_pair())),
        }
    }

    /// Total and mean trip duration in seconds.
    pub fn duration_stats(table: &FilteredTable<'_>) -> DurationStats {
        match sum_and_mean(table.iter().map(|r| r.trip.trip_duration)) {
            Some((total, mean)) => DurationStats {
                total_seconds: Some(total),
                mean_seconds: Some(mean),
            },
            None => DurationStats::default(),
        }
    }

    /// User-type counts, plus gender and birth-year figures when `schema`
    /// carries them.
    ///
    /// Blank user types and genders are not counted.
    pub fn user_stats(table: &FilteredTable<'_>, schema: CitySchema) -> UserStats {
        let user_types = value_counts(table.iter().filter_map(|r| r.trip.user_type.as_deref()));

        let demographics = match schema {
            CitySchema::Restricted => Demographics::NotReported,
            CitySchema::Standard => Demographics::Reported(Self::demographic_stats(table)),
        };

        UserStats {
            user_types,
            demographics,
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn demographic_stats(table: &FilteredTable<'_>) -> DemographicStats {
        let genders = value_counts(table.iter().filter_map(|r| r.trip.gender.as_deref()));
        let years = || table.iter().filter_map(|r| r.trip.birth_year);
        let (earliest, most_recent) = match min_max(years()) {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };

        DemographicStats {
            genders,
            earliest_birth_year: earliest,
            most_recent_birth_year: most_recent,
            most_common_birth_year: mode(years()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
