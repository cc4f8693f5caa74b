//! Display formatting for timer readouts

use std::time::Duration;
use chrono::Timelike;

/// Render milliseconds as `MM:SS` or `MM:SS.HH`
///
/// Minutes are not wrapped at the hour; anything past 59:59 simply widens
/// the minute field.
pub fn format_time(milliseconds: u64, show_hundredths: bool) -> String {
    let total_seconds = milliseconds / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    if show_hundredths {
        let hundredths = (milliseconds % 1000) / 10;
        format!("{:02}:{:02}.{:02}", minutes, seconds, hundredths)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Render a wall-clock time of day as `HH:MM:SS`
pub fn format_time_of_day<T: Timelike>(time: &T) -> String {
    format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())
}

/// Current local time of day as `HH:MM:SS`
pub fn current_time_of_day() -> String {
    format_time_of_day(&chrono::Local::now())
}

/// Human readable uptime, e.g. `1h 2m 3s`
pub fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_time(125_340, false), "02:05");
        assert_eq!(format_time(125_340, true), "02:05.34");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_time(0, false), "00:00");
        assert_eq!(format_time(0, true), "00:00.00");
    }

    #[test]
    fn truncates_rather_than_rounds() {
        assert_eq!(format_time(59_999, false), "00:59");
        assert_eq!(format_time(59_999, true), "00:59.99");
        assert_eq!(format_time(2_009, true), "00:02.00");
    }

    #[test]
    fn minutes_are_not_wrapped() {
        assert_eq!(format_time(3_599_000, false), "59:59");
        assert_eq!(format_time(3_660_000, false), "61:00");
    }

    #[test]
    fn formats_time_of_day_zero_padded() {
        let time = NaiveTime::from_hms_opt(7, 5, 9).unwrap();
        assert_eq!(format_time_of_day(&time), "07:05:09");
    }

    #[test]
    fn formats_uptime_by_magnitude() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3_725)), "1h 2m 5s");
    }
}
