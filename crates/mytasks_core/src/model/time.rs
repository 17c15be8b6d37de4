//! Timestamp helpers shared by core and presentation callers.

use std::time::{SystemTime, UNIX_EPOCH};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Returns current unix time in epoch milliseconds.
///
/// Clamps to zero for clocks set before the epoch instead of panicking.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Formats a creation timestamp relative to `now_ms`.
///
/// Rules:
/// - same day bucket -> `Today`
/// - one day back -> `Yesterday`
/// - under a week -> `N days ago`
/// - otherwise -> `YYYY-MM-DD`
pub fn format_created_at(created_at_ms: i64, now_ms: i64) -> String {
    let diff_days = (now_ms - created_at_ms) / MS_PER_DAY;
    match diff_days {
        i64::MIN..=0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{diff_days} days ago"),
        _ => format_date(created_at_ms),
    }
}

// Civil-date conversion without a calendar dependency; days-from-epoch
// algorithm over the proleptic Gregorian calendar.
fn format_date(epoch_ms: i64) -> String {
    let days = epoch_ms.div_euclid(MS_PER_DAY);
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    format!("{year:04}-{month:02}-{day:02}")
}

#[cfg(test)]
mod tests {
    use super::{format_created_at, now_epoch_ms, MS_PER_DAY};

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn now_is_positive() {
        assert!(now_epoch_ms() > 0);
    }

    #[test]
    fn same_day_formats_as_today() {
        assert_eq!(format_created_at(NOW, NOW), "Today");
        assert_eq!(format_created_at(NOW - 1000, NOW), "Today");
    }

    #[test]
    fn one_day_back_formats_as_yesterday() {
        assert_eq!(format_created_at(NOW - MS_PER_DAY, NOW), "Yesterday");
    }

    #[test]
    fn under_a_week_formats_as_days_ago() {
        assert_eq!(format_created_at(NOW - 3 * MS_PER_DAY, NOW), "3 days ago");
        assert_eq!(format_created_at(NOW - 6 * MS_PER_DAY, NOW), "6 days ago");
    }

    #[test]
    fn older_timestamps_format_as_civil_date() {
        // 2023-11-14 is day 0 for NOW; ten days earlier is 2023-11-04.
        assert_eq!(format_created_at(NOW - 10 * MS_PER_DAY, NOW), "2023-11-04");
    }

    #[test]
    fn future_timestamps_clamp_to_today() {
        assert_eq!(format_created_at(NOW + MS_PER_DAY, NOW), "Today");
    }
}
