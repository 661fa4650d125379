//! Execution duration parsing
//!
//! Runners report durations as free-form text. Three shapes are understood:
//!
//! - `"12.5s"` - number with a seconds suffix
//! - `"12.5"` - bare number, read as seconds
//! - `"1:02:03"` - hours:minutes:seconds (seconds may be fractional)
//!
//! Anything else yields `None`, which disables the timing rules only.

/// Parse a duration string into seconds.
///
/// # Examples
///
/// ```rust
/// use claimcheck::experiment::parse_duration_secs;
///
/// assert_eq!(parse_duration_secs("3s"), Some(3.0));
/// assert_eq!(parse_duration_secs("0:16:00"), Some(960.0));
/// assert_eq!(parse_duration_secs("soon"), None);
/// ```
#[must_use]
pub fn parse_duration_secs(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains(':') {
        return parse_clock(text);
    }

    let number = text.strip_suffix('s').map_or(text, str::trim_end);
    parse_non_negative(number)
}

fn parse_clock(text: &str) -> Option<f64> {
    let mut parts = text.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let hours: u64 = h.trim().parse().ok()?;
    let minutes: u64 = m.trim().parse().ok()?;
    let seconds = parse_non_negative(s)?;
    let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;

    #[allow(clippy::cast_precision_loss)]
    Some(whole as f64 + seconds)
}

fn parse_non_negative(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_suffix() {
        assert_eq!(parse_duration_secs("3s"), Some(3.0));
        assert_eq!(parse_duration_secs("1.5 s"), Some(1.5));
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(parse_duration_secs("42"), Some(42.0));
        assert_eq!(parse_duration_secs(" 0.25 "), Some(0.25));
    }

    #[test]
    fn test_clock_notation() {
        assert_eq!(parse_duration_secs("0:00:01"), Some(1.0));
        assert_eq!(parse_duration_secs("1:30:00"), Some(5400.0));
        assert_eq!(parse_duration_secs("0:01:02.5"), Some(62.5));
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("fast"), None);
        assert_eq!(parse_duration_secs("-3s"), None);
        assert_eq!(parse_duration_secs("1:2"), None);
        assert_eq!(parse_duration_secs("1:2:3:4"), None);
        assert_eq!(parse_duration_secs("NaN"), None);
        assert_eq!(parse_duration_secs("3ms"), None);
    }

    #[test]
    fn test_clock_overflow_is_unparsable() {
        assert_eq!(parse_duration_secs("9999999999999999:00:00"), None);
        assert_eq!(parse_duration_secs("0:9999999999999999999:00"), None);
        assert_eq!(parse_duration_secs("99999999999999999999:00:00"), None);
        // largest whole-hour value that still fits
        assert!(parse_duration_secs("5124095576030431:00:00").is_some_and(|s| s > 1e18));
    }
}
