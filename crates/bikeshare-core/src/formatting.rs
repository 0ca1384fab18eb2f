//! Plain-text rendering of statistic reports and raw trip rows.
//!
//! Everything here is presentational: values arrive fully computed and
//! missing ones are printed as `undefined`.

use std::fmt::Write as _;

use crate::models::{
    CitySchema, Demographics, DurationStats, EnrichedRecord, SectionTimings, StationStats,
    StatisticReport, TemporalStats, UserStats, ValueCount,
};

/// Rule printed after every report section.
pub const SECTION_RULE: &str = "----------------------------------------";

const UNDEFINED: &str = "undefined";
const LABEL_WIDTH: usize = 34;

// ── Number helpers ────────────────────────────────────────────────────────────

/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use bikeshare_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.54, 2), "-9,876.54");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + formatted.len() / 3 + 1);
    // No "-0.00": only keep the sign when a non-zero digit survives rounding.
    if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a row count with thousands separators.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Format a number of seconds as `1d 2h 3m 4s`, dropping zero units.
///
/// # Examples
///
/// ```
/// use bikeshare_core::formatting::format_duration;
///
/// assert_eq!(format_duration(936.2), "15m 36s");
/// assert_eq!(format_duration(3_600.0), "1h");
/// assert_eq!(format_duration(90_061.0), "1d 1h 1m 1s");
/// assert_eq!(format_duration(0.0), "0s");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let units = [
        (total / 86_400, 'd'),
        ((total % 86_400) / 3_600, 'h'),
        ((total % 3_600) / 60, 'm'),
        (total % 60, 's'),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

// ── Report rendering ──────────────────────────────────────────────────────────

/// Render the full report as a deterministic text block.
pub fn format_report(report: &StatisticReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "City: {} | Month: {} | Day: {} | Trips: {}",
        report.city,
        report.selection.month,
        report.selection.day,
        format_count(report.rows_matched)
    );
    if report.rows_matched == 0 {
        let _ = writeln!(out, "No trips match these filters.");
    }
    let _ = writeln!(out, "{SECTION_RULE}");

    out.push_str(&format_temporal(&report.temporal));
    out.push_str(&format_stations(&report.stations));
    out.push_str(&format_durations(&report.durations));
    out.push_str(&format_users(&report.users, report.city.display_name()));
    out
}

fn format_temporal(stats: &TemporalStats) -> String {
    let mut out = String::from("\nMost Frequent Times of Travel\n");
    push_line(&mut out, "Most common month:", stats.most_common_month);
    push_line(&mut out, "Most common day of week:", stats.most_common_day);
    push_line(&mut out, "Most common start hour:", stats.most_common_hour);
    out.push_str(SECTION_RULE);
    out.push('\n');
    out
}

fn format_stations(stats: &StationStats) -> String {
    let mut out = String::from("\nMost Popular Stations and Trip\n");
    push_line(
        &mut out,
        "Most common start station:",
        stats.most_common_start_station.as_deref(),
    );
    push_line(
        &mut out,
        "Most common end station:",
        stats.most_common_end_station.as_deref(),
    );
    push_line(
        &mut out,
        "Most frequent trip:",
        stats.most_common_trip.as_deref(),
    );
    out.push_str(SECTION_RULE);
    out.push('\n');
    out
}

fn format_durations(stats: &DurationStats) -> String {
    let mut out = String::from("\nTrip Duration\n");
    push_line(
        &mut out,
        "Total travel time:",
        stats.total_seconds.map(describe_seconds),
    );
    push_line(
        &mut out,
        "Mean travel time:",
        stats.mean_seconds.map(describe_seconds),
    );
    out.push_str(SECTION_RULE);
    out.push('\n');
    out
}

fn describe_seconds(seconds: f64) -> String {
    format!(
        "{} s ({})",
        format_number(seconds, 1),
        format_duration(seconds)
    )
}

fn format_users(stats: &UserStats, city_name: &str) -> String {
    let mut out = String::from("\nUser Stats\n");
    out.push_str("  Counts of each user type:\n");
    push_counts(&mut out, &stats.user_types);

    match &stats.demographics {
        Demographics::NotReported => {
            let _ = writeln!(out, "  {city_name} does not report gender or birth year.");
        }
        Demographics::Reported(demo) => {
            out.push_str("  Counts of each gender:\n");
            push_counts(&mut out, &demo.genders);
            out.push_str("  Note: only subscribers record gender.\n");
            push_line(
                &mut out,
                "Earliest year of birth:",
                demo.earliest_birth_year,
            );
            push_line(
                &mut out,
                "Most recent year of birth:",
                demo.most_recent_birth_year,
            );
            push_line(
                &mut out,
                "Most common year of birth:",
                demo.most_common_birth_year,
            );
        }
    }
    out.push_str(SECTION_RULE);
    out.push('\n');
    out
}

/// Render per-section compute times, one line each.
pub fn format_timings(timings: &SectionTimings) -> String {
    let mut out = String::from("\nSection timings\n");
    for (label, secs) in [
        ("Times of travel:", timings.temporal_seconds),
        ("Stations and trip:", timings.stations_seconds),
        ("Trip duration:", timings.durations_seconds),
        ("User stats:", timings.users_seconds),
    ] {
        let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{secs:.6} s");
    }
    out
}

// ── Raw row rendering ─────────────────────────────────────────────────────────

/// Render one trip row, one padded `column  value` line per field, for the
/// raw-data pager.
///
/// `row` is the zero-based position in the filtered table.
pub fn format_record(record: &EnrichedRecord, row: usize, schema: CitySchema) -> String {
    let trip = &record.trip;
    let mut out = String::new();
    let _ = writeln!(out, "Row {row}");

    let mut fields: Vec<(&str, String)> = vec![
        ("Start Time", trip.start_time.clone()),
        ("End Time", trip.end_time.clone()),
        ("Trip Duration", trip.trip_duration.to_string()),
        ("Start Station", trip.start_station.clone()),
        ("End Station", trip.end_station.clone()),
        ("User Type", or_dash(trip.user_type.as_deref())),
    ];
    if schema.has_demographics() {
        fields.push(("Gender", or_dash(trip.gender.as_deref())));
        fields.push((
            "Birth Year",
            trip.birth_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ));
    }
    fields.push(("month", record.month.to_string()));
    fields.push(("day_of_week", record.weekday_name().to_string()));
    fields.push(("hour", record.hour.to_string()));

    for (name, value) in fields {
        let _ = writeln!(out, "  {name:<16}{value}");
    }
    out
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn push_line<T: std::fmt::Display>(out: &mut String, label: &str, value: Option<T>) {
    match value {
        Some(v) => {
            let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{v}");
        }
        None => {
            let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{UNDEFINED}");
        }
    }
}

fn push_counts(out: &mut String, counts: &[ValueCount]) {
    if counts.is_empty() {
        let _ = writeln!(out, "    {UNDEFINED}");
        return;
    }
    let width = counts.iter().map(|c| c.value.len()).max().unwrap_or(0);
    for c in counts {
        let _ = writeln!(out, "    {:<width$}  {}", c.value, format_count(c.count));
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CalendarMonth, City, DayOfWeek, DaySelector, DemographicStats, FilterSelection,
        MonthSelector, TripRecord,
    };

    fn sample_report(city: City, demographics: Demographics) -> StatisticReport {
        StatisticReport {
            city,
            selection: FilterSelection::new(
                MonthSelector::Only(CalendarMonth::June),
                DaySelector::All,
            ),
            rows_matched: 1_234,
            temporal: TemporalStats {
                most_common_month: Some(CalendarMonth::June),
                most_common_day: Some(DayOfWeek::Friday),
                most_common_hour: Some(17),
            },
            stations: StationStats {
                most_common_start_station: Some("Streeter Dr & Grand Ave".to_string()),
                most_common_end_station: Some("Lake Shore Dr & Monroe St".to_string()),
                most_common_trip: Some(
                    "Streeter Dr & Grand Ave to Lake Shore Dr & Monroe St".to_string(),
                ),
            },
            durations: DurationStats {
                total_seconds: Some(600.0),
                mean_seconds: Some(200.0),
            },
            users: UserStats {
                user_types: vec![
                    ValueCount {
                        value: "Subscriber".to_string(),
                        count: 1_000,
                    },
                    ValueCount {
                        value: "Customer".to_string(),
                        count: 234,
                    },
                ],
                demographics,
            },
        }
    }

    fn empty_report(city: City) -> StatisticReport {
        let demographics = if city.schema().has_demographics() {
            Demographics::Reported(DemographicStats::default())
        } else {
            Demographics::NotReported
        };
        StatisticReport {
            city,
            selection: FilterSelection::default(),
            rows_matched: 0,
            temporal: TemporalStats::default(),
            stations: StationStats::default(),
            durations: DurationStats::default(),
            users: UserStats {
                user_types: vec![],
                demographics,
            },
        }
    }

    // ── format_number / format_count ─────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(280_871_787.0, 0), "280,871,787");
    }

    #[test]
    fn test_format_number_negative_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(300_000), "300,000");
    }

    // ── format_duration ──────────────────────────────────────────────────────

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(59.0), "59s");
        assert_eq!(format_duration(60.0), "1m");
        assert_eq!(format_duration(86_400.0), "1d");
        assert_eq!(format_duration(3_661.0), "1h 1m 1s");
    }

    #[test]
    fn test_format_duration_negative_clamps_to_zero() {
        assert_eq!(format_duration(-5.0), "0s");
    }

    // ── format_report ────────────────────────────────────────────────────────

    #[test]
    fn test_format_report_standard_city() {
        let report = sample_report(
            City::Chicago,
            Demographics::Reported(DemographicStats {
                genders: vec![ValueCount {
                    value: "Male".to_string(),
                    count: 700,
                }],
                earliest_birth_year: Some(1985),
                most_recent_birth_year: Some(1990),
                most_common_birth_year: Some(1990),
            }),
        );
        let text = format_report(&report);

        assert!(text.starts_with("City: Chicago | Month: June | Day: All | Trips: 1,234"));
        assert!(text.contains("Most common month:"));
        assert!(text.contains("June"));
        assert!(text.contains("Friday"));
        assert!(text.contains("Streeter Dr & Grand Ave to Lake Shore Dr & Monroe St"));
        assert!(text.contains("600.0 s (10m)"));
        assert!(text.contains("200.0 s (3m 20s)"));
        assert!(text.contains("Subscriber  1,000"));
        assert!(text.contains("Male  700"));
        assert!(text.contains("1985"));
        assert!(!text.contains(UNDEFINED));
    }

    #[test]
    fn test_format_report_restricted_city_marks_not_reported() {
        let report = sample_report(City::Washington, Demographics::NotReported);
        let text = format_report(&report);

        assert!(text.contains("Washington does not report gender or birth year."));
        assert!(!text.contains("Counts of each gender"));
        assert!(!text.contains("year of birth"));
    }

    #[test]
    fn test_format_report_empty_tables_render_undefined() {
        for city in City::ALL {
            let text = format_report(&empty_report(city));
            assert!(text.contains("No trips match these filters."));
            assert!(text.contains(UNDEFINED));
        }
    }

    #[test]
    fn test_format_report_is_deterministic() {
        let report = empty_report(City::NewYorkCity);
        assert_eq!(format_report(&report), format_report(&report));
    }

    #[test]
    fn test_format_report_section_rules() {
        let text = format_report(&sample_report(City::Washington, Demographics::NotReported));
        // Header plus four sections.
        assert_eq!(text.matches(SECTION_RULE).count(), 5);
    }

    // ── format_timings ───────────────────────────────────────────────────────

    #[test]
    fn test_format_timings_lists_every_section() {
        let text = format_timings(&SectionTimings::default());
        assert!(text.contains("Times of travel:"));
        assert!(text.contains("Stations and trip:"));
        assert!(text.contains("Trip duration:"));
        assert!(text.contains("User stats:"));
    }

    // ── format_record ────────────────────────────────────────────────────────

    fn sample_record(gender: Option<&str>, birth_year: Option<i32>) -> EnrichedRecord {
        EnrichedRecord {
            trip: TripRecord {
                start_time: "2017-06-23 15:09:32".to_string(),
                end_time: "2017-06-23 15:14:53".to_string(),
                trip_duration: 321.0,
                start_station: "Wood St & Hubbard St".to_string(),
                end_station: "Damen Ave & Chicago Ave".to_string(),
                user_type: Some("Subscriber".to_string()),
                gender: gender.map(str::to_string),
                birth_year,
            },
            month: 6,
            weekday: DayOfWeek::Friday,
            hour: 15,
        }
    }

    #[test]
    fn test_format_record_standard_schema() {
        let text = format_record(
            &sample_record(Some("Male"), Some(1992)),
            3,
            CitySchema::Standard,
        );
        assert!(text.starts_with("Row 3\n"));
        assert!(text.contains("Start Station   Wood St & Hubbard St"));
        assert!(text.contains("Gender          Male"));
        assert!(text.contains("Birth Year      1992"));
        assert!(text.contains("day_of_week     Friday"));
    }

    #[test]
    fn test_format_record_restricted_schema_hides_demographics() {
        let text = format_record(&sample_record(None, None), 0, CitySchema::Restricted);
        assert!(!text.contains("Gender"));
        assert!(!text.contains("Birth Year"));
    }

    #[test]
    fn test_format_record_missing_values_use_dash() {
        let text = format_record(&sample_record(None, None), 0, CitySchema::Standard);
        assert!(text.contains("Gender          -"));
        assert!(text.contains("Birth Year      -"));
    }
}
