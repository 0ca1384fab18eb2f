//! Main analysis pipeline.
//!
//! Load → enrich → filter → four aggregators, returning an
//! [`AnalysisResult`] ready for rendering and paging.

use std::time::Instant;

use bikeshare_core::error::Result;
use bikeshare_core::models::{City, FilterSelection, SectionTimings, StatisticReport};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::TripAggregator;
use crate::enrichment::EnrichedTable;
use crate::filter::{apply_filters, FilteredTable};
use crate::reader::RecordSource;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report. Timings vary between runs.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Rows in the city's file.
    pub rows_loaded: usize,
    /// Rows left after filtering.
    pub rows_matched: usize,
    /// Wall-clock seconds spent reading the CSV file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent deriving calendar fields.
    pub enrich_time_seconds: f64,
    /// Wall-clock seconds spent filtering.
    pub filter_time_seconds: f64,
    /// Wall-clock seconds per report section.
    pub sections: SectionTimings,
}

/// The complete output of [`analyze_city`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Every enriched row for the city, unfiltered.
    pub table: EnrichedTable,
    pub selection: FilterSelection,
    pub report: StatisticReport,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// The rows the report was computed over, in file order.
    pub fn filtered(&self) -> FilteredTable<'_> {
        apply_filters(&self.table, self.selection)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline for one city and selection.
///
/// Any load, schema or timestamp error aborts the run. An empty filtered
/// table is not an error.
pub fn analyze_city(
    source: &RecordSource,
    city: City,
    selection: FilterSelection,
) -> Result<AnalysisResult> {
    info!("Analyzing {} (month={}, day={})", city, selection.month, selection.day);

    // ── Step 1: Load ──────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let raw = source.load_city(city)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Enrich ────────────────────────────────────────────────────────
    let enrich_start = Instant::now();
    let table = EnrichedTable::from_city_table(raw)?;
    let enrich_time = enrich_start.elapsed().as_secs_f64();

    let mut result = analyze_table(table, selection);
    result.metadata.load_time_seconds = load_time;
    result.metadata.enrich_time_seconds = enrich_time;
    Ok(result)
}

/// Filter an already enriched table and compute the report.
pub fn analyze_table(table: EnrichedTable, selection: FilterSelection) -> AnalysisResult {
    let filter_start = Instant::now();
    let filtered = apply_filters(&table, selection);
    let filter_time = filter_start.elapsed().as_secs_f64();

    let (report, sections) = build_report(&filtered);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_loaded: table.len(),
        rows_matched: report.rows_matched,
        load_time_seconds: 0.0,
        enrich_time_seconds: 0.0,
        filter_time_seconds: filter_time,
        sections,
    };

    AnalysisResult {
        table,
        selection,
        report,
        metadata,
    }
}

/// Run the four aggregators over `filtered`, timing each one.
pub fn build_report(filtered: &FilteredTable<'_>) -> (StatisticReport, SectionTimings) {
    let (temporal, temporal_seconds) = timed(|| TripAggregator::temporal_stats(filtered));
    let (stations, stations_seconds) = timed(|| TripAggregator::station_stats(filtered));
    let (durations, durations_seconds) = timed(|| TripAggregator::duration_stats(filtered));
    let (users, users_seconds) =
        timed(|| TripAggregator::user_stats(filtered, filtered.schema()));

    let timings = SectionTimings {
        temporal_seconds,
        stations_seconds,
        durations_seconds,
        users_seconds,
    };
    debug!("Section timings: {:?}", timings);

    let report = StatisticReport {
        city: filtered.city(),
        selection: filtered.selection(),
        rows_matched: filtered.len(),
        temporal,
        stations,
        durations,
        users,
    };
    (report, timings)
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn timed<T>(f: impl FnOnce() -> T) -> (T, f64) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed().as_secs_f64())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_core::error::BikeshareError;
    use bikeshare_core::models::{
        CalendarMonth, DaySelector, Demographics, DayOfWeek, MonthSelector,
    };
    use tempfile::TempDir;

    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-01-02 08:00:00,2017-01-02 08:05:00,300,A,B,Subscriber,Male,1990.0
2,2017-01-02 17:00:00,2017-01-02 17:10:00,600,A,B,Customer,,
3,2017-02-06 08:30:00,2017-02-06 08:40:00,600,C,D,Subscriber,Female,1985.0
";

    fn source_with(city: City, body: &str) -> (TempDir, RecordSource) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(city.file_name()), body).unwrap();
        let source = RecordSource::new(dir.path()).unwrap();
        (dir, source)
    }

    // ── analyze_city ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_city_unfiltered() {
        let (_dir, source) = source_with(City::Chicago, CHICAGO_CSV);
        let result = analyze_city(&source, City::Chicago, FilterSelection::default()).unwrap();

        assert_eq!(result.metadata.rows_loaded, 3);
        assert_eq!(result.metadata.rows_matched, 3);
        assert_eq!(result.report.rows_matched, 3);
        assert_eq!(
            result.report.temporal.most_common_month,
            Some(CalendarMonth::January)
        );
        assert_eq!(result.report.temporal.most_common_day, Some(DayOfWeek::Monday));
        assert_eq!(result.report.temporal.most_common_hour, Some(8));
        assert_eq!(result.report.stations.most_common_trip.as_deref(), Some("A to B"));
        assert_eq!(result.report.durations.total_seconds, Some(1500.0));
        assert!(matches!(
            result.report.users.demographics,
            Demographics::Reported(_)
        ));
        assert!(!result.metadata.generated_at.is_empty());
    }

    #[test]
    fn test_analyze_city_filtered_matches_pager_rows() {
        let (_dir, source) = source_with(City::Chicago, CHICAGO_CSV);
        let sel = FilterSelection::new(
            MonthSelector::Only(CalendarMonth::February),
            DaySelector::All,
        );
        let result = analyze_city(&source, City::Chicago, sel).unwrap();

        assert_eq!(result.report.rows_matched, 1);
        assert_eq!(result.metadata.rows_loaded, 3);
        let filtered = result.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows()[0].trip.start_station, "C");
    }

    #[test]
    fn test_analyze_city_empty_selection_is_not_error() {
        let (_dir, source) = source_with(City::Chicago, CHICAGO_CSV);
        let sel = FilterSelection::new(
            MonthSelector::Only(CalendarMonth::June),
            DaySelector::Only(DayOfWeek::Sunday),
        );
        let result = analyze_city(&source, City::Chicago, sel).unwrap();

        assert_eq!(result.report.rows_matched, 0);
        assert!(result.report.temporal.most_common_month.is_none());
        assert!(result.report.durations.mean_seconds.is_none());
    }

    #[test]
    fn test_analyze_city_malformed_timestamp_fails_run() {
        let bad = "\
Start Time,End Time,Trip Duration,Start Station,End Station,User Type
2017-01-02 08:00:00,2017-01-02 08:05:00,300,A,B,Subscriber
garbage,2017-01-02 08:05:00,300,A,B,Subscriber
";
        let (_dir, source) = source_with(City::Washington, bad);
        let err = analyze_city(&source, City::Washington, FilterSelection::default()).unwrap_err();
        assert!(matches!(
            err,
            BikeshareError::MalformedTimestamp { row: 1, .. }
        ));
    }

    #[test]
    fn test_analyze_city_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = RecordSource::new(dir.path()).unwrap();
        let err = analyze_city(&source, City::Chicago, FilterSelection::default()).unwrap_err();
        assert!(matches!(err, BikeshareError::FileRead { .. }));
    }

    // ── build_report ──────────────────────────────────────────────────────────

    #[test]
    fn test_report_is_deterministic() {
        let (_dir, source) = source_with(City::Chicago, CHICAGO_CSV);
        let first = analyze_city(&source, City::Chicago, FilterSelection::default()).unwrap();
        let second = analyze_city(&source, City::Chicago, FilterSelection::default()).unwrap();
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_timings_are_non_negative() {
        let (_dir, source) = source_with(City::Chicago, CHICAGO_CSV);
        let result = analyze_city(&source, City::Chicago, FilterSelection::default()).unwrap();
        let s = &result.metadata.sections;
        for secs in [
            s.temporal_seconds,
            s.stations_seconds,
            s.durations_seconds,
            s.users_seconds,
            result.metadata.load_time_seconds,
        ] {
            assert!(secs >= 0.0);
        }
    }
}
