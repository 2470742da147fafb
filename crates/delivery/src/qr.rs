use chrono::{Datelike, NaiveDate};

use crate::types::MealType;

/// Pre-printed label codes stamped on items of no-remark orders, keyed by
/// delivery weekday and meal type. Remark orders carry no per-item code and
/// are verified through the bag code alone.
const NO_REMARK_FORMATS: [[&str; 6]; 7] = [
    ["MON-BF", "MON-BS", "MON-LU", "MON-LS", "MON-DN", "MON-DS"],
    ["TUE-BF", "TUE-BS", "TUE-LU", "TUE-LS", "TUE-DN", "TUE-DS"],
    ["WED-BF", "WED-BS", "WED-LU", "WED-LS", "WED-DN", "WED-DS"],
    ["THU-BF", "THU-BS", "THU-LU", "THU-LS", "THU-DN", "THU-DS"],
    ["FRI-BF", "FRI-BS", "FRI-LU", "FRI-LS", "FRI-DN", "FRI-DS"],
    ["SAT-BF", "SAT-BS", "SAT-LU", "SAT-LS", "SAT-DN", "SAT-DS"],
    ["SUN-BF", "SUN-BS", "SUN-LU", "SUN-LS", "SUN-DN", "SUN-DS"],
];

pub fn no_remark_code(date: NaiveDate, meal_type: MealType) -> &'static str {
    let day = date.weekday().num_days_from_monday() as usize;
    let meal = match meal_type {
        MealType::Breakfast => 0,
        MealType::BreakfastSnack => 1,
        MealType::Lunch => 2,
        MealType::LunchSnack => 3,
        MealType::Dinner => 4,
        MealType::DinnerSnack => 5,
    };
    NO_REMARK_FORMATS[day][meal]
}
