// utils/time.rs
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

/// Deadline for a translator response, derived from the booking horizon:
/// short-notice bookings expire quickly, far-out ones 48h before due.
pub fn will_expire_at(due: DateTime<Utc>, created_at: DateTime<Utc>) -> DateTime<Utc> {
    let horizon = due - created_at;

    let expires = if horizon <= Duration::hours(24) {
        created_at + Duration::minutes(90)
    } else if horizon <= Duration::hours(72) {
        created_at + Duration::hours(16)
    } else {
        due - Duration::hours(48)
    };

    expires.min(due)
}

/// Elapsed session time between due and end, as "H:M:S".
pub fn session_interval(due: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let elapsed = (end - due).max(Duration::zero());
    let total_secs = elapsed.num_seconds();
    format!(
        "{}:{}:{}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// "H:M:S" to total minutes; None when the string is malformed.
pub fn session_minutes(session_time: &str) -> Option<i64> {
    let parts: Vec<&str> = session_time.split(':').collect();
    if parts.len() < 3 {
        return None;
    }
    let hours: i64 = parts[0].parse().ok()?;
    let minutes: i64 = parts[1].parse().ok()?;
    let seconds: i64 = parts[2].parse().ok()?;
    Some(hours * 60 + minutes + seconds / 60)
}

/// "H:M:S" to the wording used in session-ended emails, e.g. "2h 15min".
pub fn humanize_session_time(session_time: &str) -> Option<String> {
    let parts: Vec<&str> = session_time.split(':').collect();
    if parts.len() < 2 {
        return None;
    }
    Some(format!("{}h {}min", parts[0], parts[1]))
}

pub fn convert_to_hours_mins(minutes: i32) -> String {
    if minutes < 60 {
        return format!("{}min", minutes);
    }
    if minutes == 60 {
        return "1h".to_string();
    }
    format!("{:02}h {:02}min", minutes / 60, minutes % 60)
}

/// Parses the create form's "m/d/Y" + "H:M" pair.
pub fn parse_due(due_date: &str, due_time: &str) -> Option<DateTime<Utc>> {
    let naive =
        NaiveDateTime::parse_from_str(&format!("{} {}", due_date, due_time), "%m/%d/%Y %H:%M")
            .ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Lower bound of an operator date filter; accepts a date or a full timestamp.
pub fn parse_filter_from(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Upper bound of an operator date filter, inclusive through 23:59:00.
pub fn parse_filter_to(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 0)?))
}

/// Push sends are held back during the night for translators who opted out of
/// nighttime notifications.
pub fn is_night_time(now: DateTime<Utc>) -> bool {
    let hour = now.hour();
    hour >= 22 || hour < 7
}

/// Next 09:00 after `now`; payload value for delayed pushes.
pub fn next_business_time(now: DateTime<Utc>) -> DateTime<Utc> {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let today_nine = Utc.from_utc_datetime(&now.date_naive().and_time(nine));
    if now < today_nine {
        today_nine
    } else {
        today_nine + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap())
    }

    #[test]
    fn test_will_expire_at_short_horizon() {
        let created = dt("2024-03-01 10:00:00");
        let due = dt("2024-03-01 20:00:00");
        assert_eq!(will_expire_at(due, created), dt("2024-03-01 11:30:00"));
    }

    #[test]
    fn test_will_expire_at_medium_horizon() {
        let created = dt("2024-03-01 10:00:00");
        let due = dt("2024-03-03 10:00:00");
        assert_eq!(will_expire_at(due, created), dt("2024-03-02 02:00:00"));
    }

    #[test]
    fn test_will_expire_at_long_horizon() {
        let created = dt("2024-03-01 10:00:00");
        let due = dt("2024-03-10 10:00:00");
        assert_eq!(will_expire_at(due, created), dt("2024-03-08 10:00:00"));
    }

    #[test]
    fn test_will_expire_at_never_past_due() {
        let created = dt("2024-03-01 10:00:00");
        let due = dt("2024-03-01 10:30:00");
        assert_eq!(will_expire_at(due, created), due);
    }

    #[test]
    fn test_session_interval() {
        let due = dt("2024-03-01 10:00:00");
        let end = dt("2024-03-01 12:15:30");
        assert_eq!(session_interval(due, end), "2:15:30");
    }

    #[test]
    fn test_session_interval_end_before_due() {
        let due = dt("2024-03-01 10:00:00");
        let end = dt("2024-03-01 09:00:00");
        assert_eq!(session_interval(due, end), "0:0:0");
    }

    #[test]
    fn test_session_minutes() {
        assert_eq!(session_minutes("2:15:30"), Some(135));
        assert_eq!(session_minutes("0:45:0"), Some(45));
        assert_eq!(session_minutes("bogus"), None);
    }

    #[test]
    fn test_humanize_session_time() {
        assert_eq!(humanize_session_time("2:15:30"), Some("2h 15min".to_string()));
        assert_eq!(humanize_session_time("nope"), None);
    }

    #[test]
    fn test_convert_to_hours_mins() {
        assert_eq!(convert_to_hours_mins(45), "45min");
        assert_eq!(convert_to_hours_mins(60), "1h");
        assert_eq!(convert_to_hours_mins(150), "02h 30min");
    }

    #[test]
    fn test_parse_due() {
        assert_eq!(parse_due("03/01/2024", "14:30"), Some(dt("2024-03-01 14:30:00")));
        assert_eq!(parse_due("2024-03-01", "14:30"), None);
    }

    #[test]
    fn test_parse_filter_bounds() {
        assert_eq!(parse_filter_from("2024-03-01"), Some(dt("2024-03-01 00:00:00")));
        assert_eq!(parse_filter_to("2024-03-01"), Some(dt("2024-03-01 23:59:00")));
        assert_eq!(
            parse_filter_to("2024-03-01 12:00:00"),
            Some(dt("2024-03-01 12:00:00"))
        );
    }

    #[test]
    fn test_is_night_time() {
        assert!(is_night_time(dt("2024-03-01 23:30:00")));
        assert!(is_night_time(dt("2024-03-01 03:00:00")));
        assert!(!is_night_time(dt("2024-03-01 12:00:00")));
        assert!(!is_night_time(dt("2024-03-01 07:00:00")));
    }

    #[test]
    fn test_next_business_time() {
        assert_eq!(
            next_business_time(dt("2024-03-01 23:30:00")),
            dt("2024-03-02 09:00:00")
        );
        assert_eq!(
            next_business_time(dt("2024-03-02 03:00:00")),
            dt("2024-03-02 09:00:00")
        );
    }
}
