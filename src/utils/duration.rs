//! Duration parsing for command-line timeouts.
//!
//! Accepts the same short forms people write in the YAML configuration
//! (e.g. "30s", "2m") so that `--read-timeout` and `read_timeout:` agree.

use std::time::Duration;

/// Parse a duration string (e.g., "30", "30s", "2m", "1h") into a `Duration`
///
/// Supported formats:
/// - Raw seconds: "30"
/// - Seconds: "30s", "30sec", "30secs", "30second", "30seconds"
/// - Minutes: "2m", "2min", "2mins", "2minute", "2minutes"
/// - Hours: "1h", "1hr", "1hrs", "1hour", "1hours"
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use topo_negotiator::utils::duration::parse_duration;
///
/// assert_eq!(parse_duration("30"), Ok(Duration::from_secs(30)));
/// assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
/// assert!(parse_duration("soon").is_err());
/// ```
pub fn parse_duration(duration: &str) -> Result<Duration, String> {
    let duration = duration.trim();
    let number = extract_number_part(duration);
    let unit = &duration[number.len()..];

    let multiplier = match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
        _ => return Err(format!("Invalid duration format: {}", duration)),
    };

    let value = number
        .parse::<u64>()
        .map_err(|_| format!("Invalid duration format: {}", duration))?;

    value
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("Duration out of range: {}", duration))
}

/// Extract the numeric part from a duration string by finding the first non-digit character
fn extract_number_part(duration: &str) -> &str {
    for (i, c) in duration.char_indices() {
        if !c.is_ascii_digit() {
            return &duration[0..i];
        }
    }
    duration
}
