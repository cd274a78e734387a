//! Relative date labels for chart axes
//!
//! - same day: "Today"
//! - one day earlier: "Yesterday"
//! - two to six days earlier: weekday abbreviation ("Mon")
//! - anything else, future dates included: month and day ("Sep 3")

use chrono::{Local, NaiveDate};

/// Label `date` relative to `today`
pub fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    let days_ago = (today - date).num_days();

    match days_ago {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => date.format("%a").to_string(),
        _ => date.format("%b %-d").to_string(),
    }
}

/// Current calendar day in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
