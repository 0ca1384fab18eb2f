use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::BikeshareError;

// ── Vocabularies ──────────────────────────────────────────────────────────────

/// Accepted month answers. Trip data only covers January through June.
pub const MONTH_CHOICES: &[&str] = &[
    "all", "january", "february", "march", "april", "may", "june",
];

/// Column names used in the per-city CSV headers.
pub mod columns {
    pub const START_TIME: &str = "Start Time";
    pub const END_TIME: &str = "End Time";
    pub const TRIP_DURATION: &str = "Trip Duration";
    pub const START_STATION: &str = "Start Station";
    pub const END_STATION: &str = "End Station";
    pub const USER_TYPE: &str = "User Type";
    pub const GENDER: &str = "Gender";
    pub const BIRTH_YEAR: &str = "Birth Year";
}

// ── City ──────────────────────────────────────────────────────────────────────

/// One of the cities with published trip data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "chicago")]
    Chicago,
    #[serde(rename = "new york city")]
    NewYorkCity,
    #[serde(rename = "washington")]
    Washington,
}

impl City {
    /// Every known city, in prompt order.
    pub const ALL: [City; 3] = [City::Chicago, City::NewYorkCity, City::Washington];

    /// Lower-case identifier as typed by the user.
    pub fn id(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }

    /// Title-cased name for display.
    pub fn display_name(self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYorkCity => "New York City",
            City::Washington => "Washington",
        }
    }

    /// File name of the city's CSV inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYorkCity => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    /// Which columns this city's data source publishes.
    pub fn schema(self) -> CitySchema {
        match self {
            City::Chicago | City::NewYorkCity => CitySchema::Standard,
            City::Washington => CitySchema::Restricted,
        }
    }
}

impl FromStr for City {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        City::ALL
            .into_iter()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| BikeshareError::UnknownCity(s.trim().to_string()))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ── CitySchema ────────────────────────────────────────────────────────────────

/// Structural variant of a city's data source.
///
/// `Standard` sources publish rider gender and birth year; `Restricted`
/// sources do not have those columns at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitySchema {
    Standard,
    Restricted,
}

impl CitySchema {
    pub fn has_demographics(self) -> bool {
        matches!(self, CitySchema::Standard)
    }

    /// Header columns that must be present for this schema.
    pub fn required_columns(self) -> &'static [&'static str] {
        const BASE: &[&str] = &[
            columns::START_TIME,
            columns::END_TIME,
            columns::TRIP_DURATION,
            columns::START_STATION,
            columns::END_STATION,
            columns::USER_TYPE,
        ];
        const WITH_DEMOGRAPHICS: &[&str] = &[
            columns::START_TIME,
            columns::END_TIME,
            columns::TRIP_DURATION,
            columns::START_STATION,
            columns::END_STATION,
            columns::USER_TYPE,
            columns::GENDER,
            columns::BIRTH_YEAR,
        ];
        match self {
            CitySchema::Standard => WITH_DEMOGRAPHICS,
            CitySchema::Restricted => BASE,
        }
    }
}

// ── CalendarMonth ─────────────────────────────────────────────────────────────

/// A calendar month, serialised by its English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CalendarMonth {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl CalendarMonth {
    const ORDERED: [CalendarMonth; 12] = [
        CalendarMonth::January,
        CalendarMonth::February,
        CalendarMonth::March,
        CalendarMonth::April,
        CalendarMonth::May,
        CalendarMonth::June,
        CalendarMonth::July,
        CalendarMonth::August,
        CalendarMonth::September,
        CalendarMonth::October,
        CalendarMonth::November,
        CalendarMonth::December,
    ];

    /// Month number, 1 = January.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Inverse of [`CalendarMonth::number`]; `None` outside 1–12.
    pub fn from_number(n: u32) -> Option<Self> {
        n.checked_sub(1)
            .and_then(|i| Self::ORDERED.get(i as usize).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            CalendarMonth::January => "January",
            CalendarMonth::February => "February",
            CalendarMonth::March => "March",
            CalendarMonth::April => "April",
            CalendarMonth::May => "May",
            CalendarMonth::June => "June",
            CalendarMonth::July => "July",
            CalendarMonth::August => "August",
            CalendarMonth::September => "September",
            CalendarMonth::October => "October",
            CalendarMonth::November => "November",
            CalendarMonth::December => "December",
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── DayOfWeek ─────────────────────────────────────────────────────────────────

/// A weekday, serialised by its full English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Full English name, independent of the system locale.
    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(w: chrono::Weekday) -> Self {
        match w {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Selectors ─────────────────────────────────────────────────────────────────

/// Month filter: everything, or a single month between January and June.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum MonthSelector {
    #[default]
    All,
    Only(CalendarMonth),
}

impl MonthSelector {
    /// Calendar number the filter keeps, or `None` for [`MonthSelector::All`].
    pub fn calendar_index(self) -> Option<u32> {
        match self {
            MonthSelector::All => None,
            MonthSelector::Only(m) => Some(m.number()),
        }
    }
}

impl FromStr for MonthSelector {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        match MONTH_CHOICES.iter().position(|m| *m == wanted) {
            Some(0) => Ok(MonthSelector::All),
            Some(i) => CalendarMonth::from_number(i as u32)
                .map(MonthSelector::Only)
                .ok_or_else(|| BikeshareError::InvalidMonth(s.trim().to_string())),
            None => Err(BikeshareError::InvalidMonth(s.trim().to_string())),
        }
    }
}

impl fmt::Display for MonthSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthSelector::All => f.write_str("All"),
            MonthSelector::Only(m) => write!(f, "{m}"),
        }
    }
}

impl From<MonthSelector> for String {
    fn from(s: MonthSelector) -> Self {
        s.to_string()
    }
}

/// Day filter: every day, or a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum DaySelector {
    #[default]
    All,
    Only(DayOfWeek),
}

impl DaySelector {
    /// Weekday name the filter keeps, or `None` for [`DaySelector::All`].
    pub fn weekday_name(self) -> Option<&'static str> {
        match self {
            DaySelector::All => None,
            DaySelector::Only(d) => Some(d.name()),
        }
    }
}

impl FromStr for DaySelector {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "all" {
            return Ok(DaySelector::All);
        }
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(&wanted))
            .map(DaySelector::Only)
            .ok_or_else(|| BikeshareError::InvalidDay(s.trim().to_string()))
    }
}

impl fmt::Display for DaySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaySelector::All => f.write_str("All"),
            DaySelector::Only(d) => write!(f, "{d}"),
        }
    }
}

impl From<DaySelector> for String {
    fn from(s: DaySelector) -> Self {
        s.to_string()
    }
}

/// The month and day filters chosen for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FilterSelection {
    pub month: MonthSelector,
    pub day: DaySelector,
}

impl FilterSelection {
    pub fn new(month: MonthSelector, day: DaySelector) -> Self {
        Self { month, day }
    }

    /// Whether neither filter removes anything.
    pub fn is_unfiltered(&self) -> bool {
        self.month == MonthSelector::All && self.day == DaySelector::All
    }
}

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One bike trip as published in a city's CSV file.
///
/// Columns are matched by header name. `gender` and `birth_year` are always
/// `None` for cities with a [`CitySchema::Restricted`] schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Raw start timestamp, parsed during enrichment.
    #[serde(rename = "Start Time")]
    pub start_time: String,
    /// Raw end timestamp. Not used by any statistic.
    #[serde(rename = "End Time")]
    pub end_time: String,
    /// Trip length in seconds, finite and non-negative.
    #[serde(rename = "Trip Duration", deserialize_with = "deserialize_duration")]
    pub trip_duration: f64,
    #[serde(rename = "Start Station")]
    pub start_station: String,
    #[serde(rename = "End Station")]
    pub end_station: String,
    /// Subscriber, Customer, Dependent, or blank.
    #[serde(rename = "User Type", default)]
    pub user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    pub gender: Option<String>,
    /// Stored as a float in the source files (`1992.0`).
    #[serde(
        rename = "Birth Year",
        default,
        deserialize_with = "deserialize_birth_year"
    )]
    pub birth_year: Option<i32>,
}

/// Birth years outside four digits are treated as corrupt rows.
const BIRTH_YEAR_RANGE: std::ops::RangeInclusive<f64> = 1000.0..=9999.0;

fn deserialize_duration<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 {
        return Err(de::Error::custom(format!(
            "trip duration must be a non-negative number of seconds, got {raw}"
        )));
    }
    Ok(raw)
}

fn deserialize_birth_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !BIRTH_YEAR_RANGE.contains(&raw) {
        return Err(de::Error::custom(format!(
            "birth year must be a four-digit year, got {raw}"
        )));
    }
    Ok(Some(raw.trunc() as i32))
}

// ── EnrichedRecord ────────────────────────────────────────────────────────────

/// A [`TripRecord`] plus the calendar fields derived from its start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub trip: TripRecord,
    /// Calendar month number, 1 = January.
    pub month: u32,
    pub weekday: DayOfWeek,
    /// Hour of day, 0–23.
    pub hour: u32,
}

impl EnrichedRecord {
    pub fn weekday_name(&self) -> &'static str {
        self.weekday.name()
    }

    /// Key for the start/end station combination.
    ///
    /// Concatenation means a station literally named `"X to Y"` collides
    /// with a trip from `X` to `Y`.
    pub fn station_pair(&self) -> String {
        format!("{} to {}", self.trip.start_station, self.trip.end_station)
    }
}

// ── Report types ──────────────────────────────────────────────────────────────

/// A distinct category value and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Most frequent times of travel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemporalStats {
    pub most_common_month: Option<CalendarMonth>,
    pub most_common_day: Option<DayOfWeek>,
    pub most_common_hour: Option<u32>,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationStats {
    pub most_common_start_station: Option<String>,
    pub most_common_end_station: Option<String>,
    /// `"<start> to <end>"` key of the most frequent combination.
    pub most_common_trip: Option<String>,
}

/// Total and mean trip duration in seconds; `None` for an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_seconds: Option<f64>,
    pub mean_seconds: Option<f64>,
}

/// Gender and birth-year figures for cities that publish them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemographicStats {
    pub genders: Vec<ValueCount>,
    pub earliest_birth_year: Option<i32>,
    pub most_recent_birth_year: Option<i32>,
    pub most_common_birth_year: Option<i32>,
}

/// Demographic section of the report, decided by the city's schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Demographics {
    /// The city's data source has no gender or birth-year columns.
    NotReported,
    Reported(DemographicStats),
}

/// Rider statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    /// Counts per user type, most frequent first.
    pub user_types: Vec<ValueCount>,
    pub demographics: Demographics,
}

/// Every statistic computed for one city and filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticReport {
    pub city: City,
    pub selection: FilterSelection,
    /// Rows left after filtering.
    pub rows_matched: usize,
    pub temporal: TemporalStats,
    pub stations: StationStats,
    pub durations: DurationStats,
    pub users: UserStats,
}

/// Wall-clock seconds spent in each aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionTimings {
    pub temporal_seconds: f64,
    pub stations_seconds: f64,
    pub durations_seconds: f64,
    pub users_seconds: f64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
