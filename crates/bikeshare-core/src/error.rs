use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bikeshare explorer.
///
/// An empty filtered table is not an error: aggregators report `None`
/// ("undefined") values instead.
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// The city identifier is not one of the known cities.
    #[error("Unknown city: {0}")]
    UnknownCity(String),

    /// The month name is neither `all` nor one of January through June.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// The day name is neither `all` nor a weekday name.
    #[error("Invalid day of week: {0}")]
    InvalidDay(String),

    /// A `Start Time` value could not be parsed.
    #[error("Malformed timestamp in row {row}: {value:?}")]
    MalformedTimestamp { row: usize, value: String },

    /// A data row holds a value its column does not allow, such as a
    /// negative trip duration.
    #[error("Invalid value in row {row}: {reason}")]
    InvalidField { row: usize, reason: String },

    /// A column the city's schema requires is absent from the file header.
    #[error("Missing column {column:?} in data for {city}")]
    MissingColumn { city: String, column: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV record could not be decoded.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the bikeshare crates.
pub type Result<T> = std::result::Result<T, BikeshareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_city() {
        let err = BikeshareError::UnknownCity("boston".to_string());
        assert_eq!(err.to_string(), "Unknown city: boston");
    }

    #[test]
    fn test_error_display_invalid_month() {
        let err = BikeshareError::InvalidMonth("july".to_string());
        assert_eq!(err.to_string(), "Invalid month: july");
    }

    #[test]
    fn test_error_display_invalid_day() {
        let err = BikeshareError::InvalidDay("funday".to_string());
        assert_eq!(err.to_string(), "Invalid day of week: funday");
    }

    #[test]
    fn test_error_display_malformed_timestamp() {
        let err = BikeshareError::MalformedTimestamp {
            row: 7,
            value: "yesterday".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed timestamp in row 7: \"yesterday\""
        );
    }

    #[test]
    fn test_error_display_invalid_field() {
        let err = BikeshareError::InvalidField {
            row: 3,
            reason: "field 2: bad".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value in row 3: field 2: bad");
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = BikeshareError::MissingColumn {
            city: "chicago".to_string(),
            column: "Gender".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing column \"Gender\" in data for chicago"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = BikeshareError::FileRead {
            path: PathBuf::from("/data/chicago.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/chicago.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_data_path_not_found() {
        let err = BikeshareError::DataPathNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Data path not found: /missing/dir");
    }

    #[test]
    fn test_error_display_config() {
        let err = BikeshareError::Config("--non-interactive requires --city".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: --non-interactive requires --city"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: BikeshareError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: BikeshareError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
