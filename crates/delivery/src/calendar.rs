use chrono::{Datelike, NaiveDate};

use crate::types::DeliveryOn;

/// Expands a weekday recurrence over an inclusive date range.
///
/// Returns every date in `[start, end]` whose weekday is enabled, in
/// ascending order. An empty mask or an inverted range yields an empty
/// vector, not an error.
pub fn generate_delivery_dates(
    delivery_on: &DeliveryOn,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    if delivery_on.is_empty() {
        return Vec::new();
    }

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| delivery_on.allows(date.weekday()))
        .collect()
}
