//! Month and day-of-week filtering over an [`EnrichedTable`].

use bikeshare_core::models::{City, CitySchema, DaySelector, EnrichedRecord, FilterSelection};
use tracing::debug;

use crate::enrichment::EnrichedTable;

/// Rows shown per page by the raw-data pager.
pub const PAGE_SIZE: usize = 5;

// ── FilteredTable ─────────────────────────────────────────────────────────────

/// The rows of an [`EnrichedTable`] that match a [`FilterSelection`].
///
/// Borrows from the source table and keeps its row order.
#[derive(Debug, Clone)]
pub struct FilteredTable<'a> {
    city: City,
    schema: CitySchema,
    selection: FilterSelection,
    rows: Vec<&'a EnrichedRecord>,
}

impl<'a> FilteredTable<'a> {
    pub fn city(&self) -> City {
        self.city
    }

    pub fn schema(&self) -> CitySchema {
        self.schema
    }

    pub fn selection(&self) -> FilterSelection {
        self.selection
    }

    pub fn rows(&self) -> &[&'a EnrichedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a EnrichedRecord> {
        self.rows.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EnrichedRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Up to `size` rows starting at `offset`; empty once past the end.
    pub fn page(&self, offset: usize, size: usize) -> &[&'a EnrichedRecord] {
        let start = offset.min(self.rows.len());
        let end = offset.saturating_add(size).min(self.rows.len());
        &self.rows[start..end]
    }
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Keep the rows of `table` matching both selectors.
pub fn apply_filters(table: &EnrichedTable, selection: FilterSelection) -> FilteredTable<'_> {
    let rows: Vec<&EnrichedRecord> = if selection.is_unfiltered() {
        table.records.iter().collect()
    } else {
        table
            .records
            .iter()
            .filter(|r| matches_selection(r, &selection))
            .collect()
    };

    debug!(
        "Filter month={} day={} kept {} of {} rows",
        selection.month,
        selection.day,
        rows.len(),
        table.len()
    );

    FilteredTable {
        city: table.city,
        schema: table.schema,
        selection,
        rows,
    }
}

/// Whether `record` passes both the month and the day selector.
pub fn matches_selection(record: &EnrichedRecord, selection: &FilterSelection) -> bool {
    let month_ok = match selection.month.calendar_index() {
        None => true,
        Some(n) => record.month == n,
    };
    let day_ok = match selection.day {
        DaySelector::All => true,
        DaySelector::Only(d) => record.weekday == d,
    };
    month_ok && day_ok
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::enrich_records;
    use bikeshare_core::models::{CalendarMonth, DayOfWeek, MonthSelector, TripRecord};

    fn trip(start_time: &str, station: &str) -> TripRecord {
        TripRecord {
            start_time: start_time.to_string(),
            end_time: start_time.to_string(),
            trip_duration: 60.0,
            start_station: station.to_string(),
            end_station: "Z".to_string(),
            user_type: None,
            gender: None,
            birth_year: None,
        }
    }

    fn table(rows: &[(&str, &str)]) -> EnrichedTable {
        let trips = rows.iter().map(|(t, s)| trip(t, s)).collect();
        EnrichedTable {
            city: City::Chicago,
            schema: CitySchema::Standard,
            records: enrich_records(trips).unwrap(),
        }
    }

    fn stations(filtered: &FilteredTable<'_>) -> Vec<String> {
        filtered.iter().map(|r| r.trip.start_station.clone()).collect()
    }

    // ── apply_filters ─────────────────────────────────────────────────────────

    #[test]
    fn test_all_all_keeps_every_row() {
        let t = table(&[
            ("2017-01-02 08:00:00", "a"),
            ("2017-02-03 08:00:00", "b"),
            ("2017-03-04 08:00:00", "c"),
        ]);
        let filtered = apply_filters(&t, FilterSelection::default());
        assert_eq!(filtered.len(), 3);
        assert_eq!(stations(&filtered), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_month_filter() {
        let t = table(&[
            ("2017-01-02 08:00:00", "a"),
            ("2017-01-20 08:00:00", "b"),
            ("2017-02-03 08:00:00", "c"),
            ("2017-03-04 08:00:00", "d"),
        ]);
        let sel = FilterSelection::new(MonthSelector::Only(CalendarMonth::January), DaySelector::All);
        let filtered = apply_filters(&t, sel);
        assert_eq!(filtered.len(), 2);
        assert_eq!(stations(&filtered), vec!["a", "b"]);
    }

    #[test]
    fn test_day_filter() {
        // 2017-01-02 Monday, 2017-01-03 Tuesday, 2017-01-09 Monday.
        let t = table(&[
            ("2017-01-02 08:00:00", "a"),
            ("2017-01-03 08:00:00", "b"),
            ("2017-01-09 08:00:00", "c"),
        ]);
        let sel = FilterSelection::new(MonthSelector::All, DaySelector::Only(DayOfWeek::Monday));
        assert_eq!(stations(&apply_filters(&t, sel)), vec!["a", "c"]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        // 2017-02-06 Monday (February), 2017-01-02 Monday (January).
        let t = table(&[
            ("2017-02-06 08:00:00", "feb-mon"),
            ("2017-01-02 08:00:00", "jan-mon"),
            ("2017-02-07 08:00:00", "feb-tue"),
        ]);
        let sel = FilterSelection::new(
            MonthSelector::Only(CalendarMonth::February),
            DaySelector::Only(DayOfWeek::Monday),
        );
        assert_eq!(stations(&apply_filters(&t, sel)), vec!["feb-mon"]);
    }

    #[test]
    fn test_result_is_subsequence_of_source() {
        let t = table(&[
            ("2017-03-01 08:00:00", "a"),
            ("2017-01-01 08:00:00", "b"),
            ("2017-03-02 08:00:00", "c"),
            ("2017-05-01 08:00:00", "d"),
            ("2017-03-03 08:00:00", "e"),
        ]);
        let sel = FilterSelection::new(MonthSelector::Only(CalendarMonth::March), DaySelector::All);
        let filtered = apply_filters(&t, sel);

        let mut source = t.records.iter();
        for row in filtered.iter() {
            assert!(source.any(|r| std::ptr::eq(r, row)));
        }
        assert_eq!(stations(&filtered), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let t = table(&[("2017-01-02 08:00:00", "a")]);
        let sel = FilterSelection::new(MonthSelector::Only(CalendarMonth::June), DaySelector::All);
        let filtered = apply_filters(&t, sel);
        assert!(filtered.is_empty());
        assert!(filtered.get(0).is_none());
        assert_eq!(filtered.city(), City::Chicago);
    }

    #[test]
    fn test_filtered_table_carries_selection() {
        let t = table(&[]);
        let sel = FilterSelection::new(MonthSelector::All, DaySelector::Only(DayOfWeek::Sunday));
        let filtered = apply_filters(&t, sel);
        assert_eq!(filtered.selection(), sel);
        assert_eq!(filtered.schema(), CitySchema::Standard);
    }

    // ── page ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_page_walks_rows_and_stops_at_end() {
        let rows: Vec<(String, String)> = (0..12)
            .map(|i| (format!("2017-01-{:02} 08:00:00", i + 1), format!("s{i}")))
            .collect();
        let refs: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let t = table(&refs);
        let filtered = apply_filters(&t, FilterSelection::default());

        assert_eq!(filtered.page(0, PAGE_SIZE).len(), 5);
        assert_eq!(filtered.page(5, PAGE_SIZE).len(), 5);
        let last = filtered.page(10, PAGE_SIZE);
        assert_eq!(last.len(), 2);
        assert_eq!(last[1].trip.start_station, "s11");
        assert!(filtered.page(15, PAGE_SIZE).is_empty());
        assert!(filtered.page(usize::MAX, PAGE_SIZE).is_empty());
    }
}
