use chrono::{Duration, NaiveDate, NaiveTime};

const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

// Convert an Excel serial date to an ISO date or datetime string
#[must_use]
pub fn excel_date_to_iso_string(excel_date: f64) -> Option<String> {
    if !excel_date.is_finite() || excel_date < 0.0 {
        return None;
    }

    // Excel's calendar ends at 9999-12-31
    if excel_date >= MAX_EXCEL_SERIAL {
        return None;
    }

    // Serial 60 is the fictional 1900-02-29
    let days = if excel_date > 59.0 {
        excel_date - 1.0
    } else {
        excel_date
    };

    let base_date = NaiveDate::from_ymd_opt(1899, 12, 31)?;
    let total_seconds = (days * 86_400.0).round() as i64;
    let whole_days = total_seconds.div_euclid(86_400);
    let seconds = total_seconds.rem_euclid(86_400) as u32;

    let date = base_date.checked_add_signed(Duration::try_days(whole_days)?)?;

    if seconds == 0 {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string())
}

#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
