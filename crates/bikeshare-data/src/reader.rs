//! Per-city CSV loading.
//!
//! Each city publishes one CSV file. Columns are mapped by header name and
//! checked against the city's [`CitySchema`] before any row is decoded.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use bikeshare_core::error::{BikeshareError, Result};
use bikeshare_core::models::{City, CitySchema, TripRecord};
use tracing::{debug, info};

// ── CityTable ─────────────────────────────────────────────────────────────────

/// Every raw trip published for one city, in file order.
#[derive(Debug, Clone)]
pub struct CityTable {
    pub city: City,
    /// Resolved once from `city`; decides whether demographics exist.
    pub schema: CitySchema,
    pub records: Vec<TripRecord>,
}

impl CityTable {
    pub fn new(city: City, records: Vec<TripRecord>) -> Self {
        Self {
            city,
            schema: city.schema(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── RecordSource ──────────────────────────────────────────────────────────────

/// Maps a city to its trip table inside a data directory.
#[derive(Debug, Clone)]
pub struct RecordSource {
    data_dir: PathBuf,
}

impl RecordSource {
    /// Use `data_dir` as the location of the city CSV files.
    ///
    /// Fails with [`BikeshareError::DataPathNotFound`] when the directory
    /// does not exist.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            return Err(BikeshareError::DataPathNotFound(data_dir));
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of `city`'s CSV file, whether or not it exists.
    pub fn path_for(&self, city: City) -> PathBuf {
        self.data_dir.join(city.file_name())
    }

    /// Cities whose CSV file is present in the data directory.
    pub fn available_cities(&self) -> Vec<City> {
        City::ALL
            .into_iter()
            .filter(|c| self.path_for(*c).is_file())
            .collect()
    }

    /// Load the table for a city identifier such as `"new york city"`.
    ///
    /// Unknown identifiers are rejected with [`BikeshareError::UnknownCity`]
    /// before any file is touched.
    pub fn load(&self, city_id: &str) -> Result<CityTable> {
        let city: City = city_id.parse()?;
        self.load_city(city)
    }

    /// Load every trip for `city`.
    pub fn load_city(&self, city: City) -> Result<CityTable> {
        let path = self.path_for(city);
        let file = File::open(&path).map_err(|source| BikeshareError::FileRead {
            path: path.clone(),
            source,
        })?;

        let records = read_trip_records(file, city)?;
        info!(
            "Loaded {} trips for {} from {}",
            records.len(),
            city,
            path.display()
        );
        Ok(CityTable::new(city, records))
    }
}

// ── CSV decoding ──────────────────────────────────────────────────────────────

/// Decode trip rows from CSV text with a header line.
///
/// Header names are trimmed before matching. Columns that `city`'s schema
/// requires must all be present; extra columns (such as the unnamed index
/// column in the published files) are ignored. Any undecodable row fails the
/// whole load, with its 0-based row index when the row itself is at fault.
pub fn read_trip_records<R: Read>(reader: R, city: City) -> Result<Vec<TripRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    check_required_columns(rdr.headers()?, city)?;

    let mut records = Vec::new();
    for (row, decoded) in rdr.deserialize::<TripRecord>().enumerate() {
        records.push(decoded.map_err(|e| row_error(row, e))?);
    }

    let records = match city.schema() {
        CitySchema::Standard => records,
        // Demographic columns are not part of this schema even if a file
        // happens to carry them.
        CitySchema::Restricted => records
            .into_iter()
            .map(|r| TripRecord {
                gender: None,
                birth_year: None,
                ..r
            })
            .collect(),
    };

    debug!("Decoded {} rows for {}", records.len(), city);
    Ok(records)
}

/// Value errors become [`BikeshareError::InvalidField`]; anything else
/// (bad UTF-8, ragged rows, I/O) stays a CSV error.
fn row_error(row: usize, err: csv::Error) -> BikeshareError {
    match err.kind() {
        csv::ErrorKind::Deserialize { err: value_err, .. } => BikeshareError::InvalidField {
            row,
            reason: value_err.to_string(),
        },
        _ => BikeshareError::Csv(err),
    }
}

fn check_required_columns(headers: &csv::StringRecord, city: City) -> Result<()> {
    for column in city.schema().required_columns() {
        if !headers.iter().any(|h| h == *column) {
            return Err(BikeshareError::MissingColumn {
                city: city.id().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
