use chrono::{DateTime, NaiveDate, Utc};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Parse a stored date: either a bare `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

/// Render a date like `Jan 5, 2024`.
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_date(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => "N/A".to_string(),
        Some(raw) => match parse_date(raw) {
            Some(date) => format_naive_date(date),
            None => "Invalid Date".to_string(),
        },
    }
}

/// Whole days from `now` until midnight UTC of `target`, rounded up.
///
/// Negative once the target has passed.
pub fn day_delta(target: NaiveDate, now: DateTime<Utc>) -> i64 {
    let target = target.and_time(chrono::NaiveTime::MIN).and_utc();
    let ms = (target - now).num_milliseconds();
    // Integer division truncates toward zero, which is already the ceiling
    // for negative deltas.
    if ms > 0 && ms % DAY_MS != 0 {
        ms / DAY_MS + 1
    } else {
        ms / DAY_MS
    }
}

/// Days left until `target`, clamped at zero. An overdue date reports `0`,
/// the same as a date due today; use [`TransplantCountdown`] to tell them apart.
pub fn days_remaining(target: Option<NaiveDate>, now: DateTime<Utc>) -> Option<i64> {
    target.map(|target| day_delta(target, now).max(0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransplantCountdown {
    InDays(i64),
    Today,
    Overdue(i64),
}

impl TransplantCountdown {
    pub fn from_delta(delta: i64) -> Self {
        match delta {
            d if d > 0 => Self::InDays(d),
            0 => Self::Today,
            d => Self::Overdue(-d),
        }
    }

    pub fn for_date(target: Option<NaiveDate>, now: DateTime<Utc>) -> Option<Self> {
        target.map(|target| Self::from_delta(day_delta(target, now)))
    }
}

impl std::fmt::Display for TransplantCountdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InDays(days) => write!(f, "Transplant in {days} days"),
            Self::Today => write!(f, "Transplant Today!"),
            Self::Overdue(days) => write!(f, "Transplant due (overdue by {days} days)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn format_date_cases() {
        assert_eq!(format_date(Some("2024-01-05")), "Jan 5, 2024");
        assert_eq!(format_date(Some("2024-03-10T08:30:00Z")), "Mar 10, 2024");
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(format_date(Some("not-a-date")), "Invalid Date");
    }

    #[test]
    fn days_remaining_counts_up_and_clamps() {
        let now = noon(2024, 1, 1);
        let today = now.date_naive();
        assert_eq!(days_remaining(Some(today + Duration::days(10)), now), Some(10));
        assert_eq!(days_remaining(Some(today - Duration::days(5)), now), Some(0));
        assert_eq!(days_remaining(None, now), None);
    }

    #[test]
    fn overdue_is_clamped_but_delta_keeps_sign() {
        // days_remaining cannot tell "today" from "overdue"; the raw delta can.
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(days_remaining(Some(past), now), Some(0));
        assert_eq!(day_delta(past, now), -5);
        assert_eq!(
            TransplantCountdown::for_date(Some(past), now),
            Some(TransplantCountdown::Overdue(5))
        );
    }

    #[test]
    fn countdown_today_and_future() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let today = midnight.date_naive();
        assert_eq!(
            TransplantCountdown::for_date(Some(today), midnight),
            Some(TransplantCountdown::Today)
        );
        assert_eq!(
            TransplantCountdown::for_date(Some(today + Duration::days(3)), midnight)
                .unwrap()
                .to_string(),
            "Transplant in 3 days"
        );
    }
}
