//! Calendar periods for datetime indexes and time-based grouping.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Enumeration representing the frequency (period) of time series data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Every second
    Secondly,
    /// Every minute
    Minutely,
    /// Every hour
    Hourly,
    /// Every day
    Daily,
    /// Every week
    Weekly,
    /// Every month
    Monthly,
    /// Every quarter (3 months)
    Quarterly,
    /// Every year
    Yearly,
    /// Custom period
    Custom(Duration),
}

impl Frequency {
    /// Parse a frequency from a string such as `"D"`, `"2H"` or `"1 day"`
    pub fn parse(s: &str) -> Option<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_uppercase().as_str() {
            "S" | "SEC" | "SECOND" | "SECONDS" => Some(Frequency::Secondly),
            "T" | "MIN" | "MINUTE" | "MINUTES" => Some(Frequency::Minutely),
            "H" | "HOUR" | "HOURS" | "HOURLY" => Some(Frequency::Hourly),
            "D" | "DAY" | "DAYS" | "DAILY" => Some(Frequency::Daily),
            "W" | "WEEK" | "WEEKS" | "WEEKLY" => Some(Frequency::Weekly),
            "M" | "MONTH" | "MONTHS" | "MONTHLY" => Some(Frequency::Monthly),
            "Q" | "QUARTER" | "QUARTERS" | "QUARTERLY" => Some(Frequency::Quarterly),
            "Y" | "YEAR" | "YEARS" | "A" | "ANNUAL" | "ANNUALLY" | "YEARLY" => {
                Some(Frequency::Yearly)
            }
            other => parse_custom_frequency(other),
        }
    }

    /// Approximate number of seconds covered by one period.
    /// Months and years are estimated.
    pub fn to_seconds(&self) -> i64 {
        match self {
            Frequency::Secondly => 1,
            Frequency::Minutely => 60,
            Frequency::Hourly => 3600,
            Frequency::Daily => 86400,
            Frequency::Weekly => 604800,
            Frequency::Monthly => 2592000,   // estimated as 30 days
            Frequency::Quarterly => 7776000, // estimated as 90 days
            Frequency::Yearly => 31536000,   // estimated as 365 days
            Frequency::Custom(duration) => duration.num_seconds(),
        }
    }

    /// Truncate a timestamp to the start of the period bucket containing it.
    ///
    /// Weekly buckets start on Monday; custom buckets count whole periods
    /// from the Unix epoch.
    pub fn floor(&self, t: NaiveDateTime) -> NaiveDateTime {
        let date = t.date();
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).unwrap_or(t);
        match self {
            Frequency::Secondly => t.with_nanosecond(0).unwrap_or(t),
            Frequency::Minutely => midnight(date) + Duration::minutes(i64::from(t.hour()) * 60 + i64::from(t.minute())),
            Frequency::Hourly => midnight(date) + Duration::hours(i64::from(t.hour())),
            Frequency::Daily => midnight(date),
            Frequency::Weekly => {
                let back = date.weekday().num_days_from_monday();
                midnight(date - Duration::days(i64::from(back)))
            }
            Frequency::Monthly => midnight(date.with_day(1).unwrap_or(date)),
            Frequency::Quarterly => {
                let month = (date.month0() / 3) * 3 + 1;
                midnight(
                    date.with_day(1)
                        .and_then(|d| d.with_month(month))
                        .unwrap_or(date),
                )
            }
            Frequency::Yearly => midnight(
                date.with_day(1)
                    .and_then(|d| d.with_month(1))
                    .unwrap_or(date),
            ),
            Frequency::Custom(duration) => {
                let step = duration.num_seconds();
                if step <= 0 {
                    return t;
                }
                let secs = t.and_utc().timestamp();
                let start = secs.div_euclid(step) * step;
                chrono::DateTime::from_timestamp(start, 0)
                    .map(|d| d.naive_utc())
                    .unwrap_or(t)
            }
        }
    }

    /// Advance a timestamp by one period
    pub fn advance(&self, t: NaiveDateTime) -> NaiveDateTime {
        match self {
            Frequency::Monthly => add_months(t, 1),
            Frequency::Quarterly => add_months(t, 3),
            Frequency::Yearly => add_months(t, 12),
            Frequency::Custom(duration) => t + *duration,
            _ => t + Duration::seconds(self.to_seconds()),
        }
    }
}

fn add_months(t: NaiveDateTime, months: u32) -> NaiveDateTime {
    let total = t.month0() + months;
    let year = t.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    NaiveDate::from_ymd_opt(year, month, t.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 1))
        .and_then(|d| d.and_hms_opt(t.hour(), t.minute(), t.second()))
        .unwrap_or(t)
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "S"),
            Frequency::Minutely => write!(f, "T"),
            Frequency::Hourly => write!(f, "H"),
            Frequency::Daily => write!(f, "D"),
            Frequency::Weekly => write!(f, "W"),
            Frequency::Monthly => write!(f, "M"),
            Frequency::Quarterly => write!(f, "Q"),
            Frequency::Yearly => write!(f, "Y"),
            Frequency::Custom(duration) => write!(f, "{}s", duration.num_seconds()),
        }
    }
}

/// Parse a custom frequency string such as `"3D"` or `"2H"`
fn parse_custom_frequency(s: &str) -> Option<Frequency> {
    let mut num_chars = String::new();
    let mut unit_chars = String::new();
    let mut found_digit = false;

    for c in s.chars() {
        if c.is_ascii_digit() {
            found_digit = true;
            num_chars.push(c);
        } else if found_digit {
            unit_chars.push(c);
        } else {
            // Numbers must come first
            return None;
        }
    }

    if num_chars.is_empty() || unit_chars.is_empty() {
        return None;
    }

    let num: i64 = num_chars.parse().ok()?;

    match unit_chars.to_uppercase().as_str() {
        "S" | "SEC" | "SECOND" | "SECONDS" => Some(Frequency::Custom(Duration::seconds(num))),
        "T" | "MIN" | "MINUTE" | "MINUTES" => Some(Frequency::Custom(Duration::minutes(num))),
        "H" | "HOUR" | "HOURS" => Some(Frequency::Custom(Duration::hours(num))),
        "D" | "DAY" | "DAYS" => Some(Frequency::Custom(Duration::days(num))),
        "W" | "WEEK" | "WEEKS" => Some(Frequency::Custom(Duration::weeks(num))),
        _ => None,
    }
}
