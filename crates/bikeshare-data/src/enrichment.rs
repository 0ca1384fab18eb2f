//! Derives month, weekday and hour from each trip's start time.

use bikeshare_core::error::{BikeshareError, Result};
use bikeshare_core::models::{City, CitySchema, EnrichedRecord, TripRecord};
use bikeshare_core::time_utils::{parse_trip_timestamp, CalendarFields};
use tracing::debug;

use crate::reader::CityTable;

// ── EnrichedTable ─────────────────────────────────────────────────────────────

/// A city's trips with calendar fields attached, in file order.
#[derive(Debug, Clone)]
pub struct EnrichedTable {
    pub city: City,
    pub schema: CitySchema,
    pub records: Vec<EnrichedRecord>,
}

impl EnrichedTable {
    /// Enrich every row of `table`.
    ///
    /// Fails on the first row whose start time cannot be parsed; no row is
    /// ever dropped.
    pub fn from_city_table(table: CityTable) -> Result<Self> {
        let records = enrich_records(table.records)?;
        debug!("Enriched {} trips for {}", records.len(), table.city);
        Ok(Self {
            city: table.city,
            schema: table.schema,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Enrichment ────────────────────────────────────────────────────────────────

/// Attach calendar fields to each record, preserving order.
pub fn enrich_records(records: Vec<TripRecord>) -> Result<Vec<EnrichedRecord>> {
    records
        .into_iter()
        .enumerate()
        .map(|(row, trip)| enrich_record(trip, row))
        .collect()
}

/// Attach calendar fields to one record; `row` is its 0-based position and
/// is only used in the error.
pub fn enrich_record(trip: TripRecord, row: usize) -> Result<EnrichedRecord> {
    let start = parse_trip_timestamp(&trip.start_time).ok_or_else(|| {
        BikeshareError::MalformedTimestamp {
            row,
            value: trip.start_time.clone(),
        }
    })?;
    let fields = CalendarFields::from_datetime(&start);

    Ok(EnrichedRecord {
        trip,
        month: fields.month,
        weekday: fields.weekday,
        hour: fields.hour,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
