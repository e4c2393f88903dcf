//! Validation helper functions for configuration values
//!
//! Every check runs once at startup; a failure stops the daemon before the
//! first cycle.

use crate::disposition::{Disposition, Markers};
use crate::error::ConfigError;
use crate::recurring::EndOfDayShift;
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};

/// Parse a single marker character
///
/// # Arguments
/// * `text` - Marker as given in the config file or on the command line
///
/// # Returns
/// The marker character, or an error if `text` is not exactly one character
pub fn parse_marker(text: &str) -> Result<char, ConfigError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c),
        _ => Err(ConfigError::InvalidMarker(text.to_string())),
    }
}

/// Build the marker pair, rejecting clashes
///
/// The two markers must differ and neither may be the header glyph `*`.
pub fn validate_markers(sequential: &str, parallel: &str) -> Result<Markers, ConfigError> {
    let sequential = parse_marker(sequential)?;
    let parallel = parse_marker(parallel)?;

    if sequential == parallel {
        return Err(ConfigError::MarkerConflict(sequential));
    }
    for c in [sequential, parallel] {
        if c == '*' {
            return Err(ConfigError::MarkerIsHeaderGlyph(c));
        }
    }
    Ok(Markers {
        sequential,
        parallel,
    })
}

/// Check the end-of-day hour
///
/// # Arguments
/// * `hour` - Hour at which the user's day ends, 1 to 24
pub fn validate_end_of_day(hour: u8) -> Result<EndOfDayShift, ConfigError> {
    if !(1..=24).contains(&hour) {
        return Err(ConfigError::EndOfDayOutOfRange(hour));
    }
    Ok(EndOfDayShift::new(u32::from(hour)))
}

/// Parse the inbox disposition ("sequential" or "parallel")
pub fn parse_inbox_mode(text: &str) -> Result<Disposition, ConfigError> {
    text.parse::<Disposition>()
        .map_err(|_| ConfigError::InvalidInboxMode(text.to_string()))
}

/// Trim the label name and reject an empty one
pub fn validate_label(label: &str) -> Result<String, ConfigError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ConfigError::EmptyLabel);
    }
    Ok(label.to_string())
}

/// Check that a start-date format can both print and read back a date
///
/// # Arguments
/// * `format` - chrono strftime format, e.g. `%d-%m-%Y`
pub fn validate_date_format(format: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidDateFormat(format.to_string());

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let probe = NaiveDate::from_ymd_opt(2024, 12, 31).ok_or_else(invalid)?;
    let printed = probe.format(format).to_string();
    match NaiveDate::parse_from_str(&printed, format) {
        Ok(parsed) if parsed == probe => Ok(format.to_string()),
        _ => Err(invalid()),
    }
}

/// Require a non-empty API token
pub fn require_api_key(key: Option<&str>) -> Result<String, ConfigError> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}
