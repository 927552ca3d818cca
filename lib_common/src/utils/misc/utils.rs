use chrono::{DateTime, Utc};

/// Current UTC time formatted for log records, e.g. `2024-01-15T23:59:56.123Z`.
pub fn current_datetime_rfc9557() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Title-cases a label: a letter is upper-cased when it follows a non-letter
/// and lower-cased otherwise. `"extreme greed"` becomes `"Extreme Greed"`,
/// `"N/A"` stays `"N/A"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_alpha = false;
    for c in text.chars() {
        if prev_is_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_alpha = c.is_alphabetic();
    }
    out
}
