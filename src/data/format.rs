//! Display formatters for dashboard metrics.
//!
//! All functions here are stateless and deterministic; anything that
//! depends on the current time takes `now` as a parameter so callers
//! (and tests) control the reference point.

use chrono::{DateTime, Utc};

/// Date rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// "Mar 5, 2026, 2:07 PM"
    Full,
    /// "Mar 5"
    Short,
    /// "2:07 PM"
    Time,
}

/// Format a timestamp in en-US style.
pub fn format_date(dt: DateTime<Utc>, style: DateStyle) -> String {
    match style {
        DateStyle::Full => dt.format("%b %-d, %Y, %-I:%M %p").to_string(),
        DateStyle::Short => dt.format("%b %-d").to_string(),
        DateStyle::Time => dt.format("%-I:%M %p").to_string(),
    }
}

/// Format a dollar amount rounded to whole units with comma grouping.
///
/// Negative values render as "-$1,234".
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let whole = rounded.abs() as u64;
    let grouped = group_thousands(whole);
    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push_str(&format!(",{:03}", g));
    }
    out
}

/// Format a fraction as a percentage with one decimal place.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Format a number with a fixed decimal count.
pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Signed day count from `now` until `target`, rounded up.
///
/// Past dates yield negative values; a target later today yields 1.
pub fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff_secs = (target - now).num_seconds() as f64;
    (diff_secs / 86_400.0).ceil() as i64
}

/// Coarse relative-time label for an event in the past.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    format!("{}d ago", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 5, 14, 7, 0).unwrap()
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.734), "73.4%");
        assert_eq!(format_percentage(1.0), "100.0%");
        assert_eq!(format_percentage(0.0), "0.0%");
        assert_eq!(format_percentage(0.005), "0.5%");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(45000.0), "$45,000");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(1000.0), "$1,000");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
    }

    #[test]
    fn test_format_currency_rounds_to_whole_units() {
        assert_eq!(format_currency(45000.49), "$45,000");
        assert_eq!(format_currency(45000.5), "$45,001");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-1234.0), "-$1,234");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.14159, 1), "3.1");
        assert_eq!(format_number(3.14159, 3), "3.142");
    }

    #[test]
    fn test_format_date_styles() {
        let dt = fixed_now();
        assert_eq!(format_date(dt, DateStyle::Full), "Mar 5, 2026, 2:07 PM");
        assert_eq!(format_date(dt, DateStyle::Short), "Mar 5");
        assert_eq!(format_date(dt, DateStyle::Time), "2:07 PM");
    }

    #[test]
    fn test_format_date_morning() {
        let dt = Utc.with_ymd_and_hms(2026, 11, 23, 9, 30, 0).unwrap();
        assert_eq!(format_date(dt, DateStyle::Time), "9:30 AM");
        assert_eq!(format_date(dt, DateStyle::Short), "Nov 23");
    }

    #[test]
    fn test_days_until_future() {
        let now = fixed_now();
        assert_eq!(days_until(now + Duration::days(2), now), 2);
        // A partial day rounds up.
        assert_eq!(days_until(now + Duration::hours(30), now), 2);
        assert_eq!(days_until(now + Duration::hours(1), now), 1);
    }

    #[test]
    fn test_days_until_past() {
        let now = fixed_now();
        assert_eq!(days_until(now - Duration::days(3), now), -3);
        assert_eq!(days_until(now, now), 0);
    }

    #[test]
    fn test_relative_time() {
        let now = fixed_now();
        assert_eq!(relative_time(now - Duration::seconds(30), now), "Just now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - Duration::days(2), now), "2d ago");
    }
}
