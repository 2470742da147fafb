use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use uuid::Uuid;

/// Weekday-pair buckets used to pack consecutive delivery days into one
/// physical bag group. Sunday has no pair and falls into the residual
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryGroup {
    MonTue,
    WedThu,
    FriSat,
    Other,
}

impl DeliveryGroup {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon | Weekday::Tue => DeliveryGroup::MonTue,
            Weekday::Wed | Weekday::Thu => DeliveryGroup::WedThu,
            Weekday::Fri | Weekday::Sat => DeliveryGroup::FriSat,
            Weekday::Sun => DeliveryGroup::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryGroup::MonTue => "mon-tue",
            DeliveryGroup::WedThu => "wed-thu",
            DeliveryGroup::FriSat => "fri-sat",
            DeliveryGroup::Other => "other",
        }
    }
}

/// Bucket key: this weekday pair, this ISO week.
pub fn group_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!(
        "{}-{}-W{:02}",
        DeliveryGroup::of(date).as_str(),
        week.year(),
        week.week()
    )
}

/// Assigns a scan code to every delivery date.
///
/// No-remark orders share one freshly generated code per weekly bucket so
/// the dates packed together can be scanned as a group; orders with a
/// remark get an individual code per date.
pub fn assign_scan_codes(dates: &[NaiveDate], no_remark_type: bool) -> HashMap<NaiveDate, String> {
    let mut codes: HashMap<NaiveDate, String> = HashMap::new();

    if no_remark_type {
        let mut by_bucket: HashMap<String, String> = HashMap::new();
        for &date in dates {
            let code = by_bucket
                .entry(group_key(date))
                .or_insert_with(|| Uuid::new_v4().to_string());
            codes.entry(date).or_insert_with(|| code.clone());
        }
    } else {
        for &date in dates {
            codes
                .entry(date)
                .or_insert_with(|| Uuid::new_v4().to_string());
        }
    }

    codes
}
