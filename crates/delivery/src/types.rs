use chrono::Weekday;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Meal type enum — string values match the `meal_type` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    BreakfastSnack,
    Lunch,
    LunchSnack,
    Dinner,
    DinnerSnack,
}

impl MealType {
    pub const ALL: [MealType; 6] = [
        MealType::Breakfast,
        MealType::BreakfastSnack,
        MealType::Lunch,
        MealType::LunchSnack,
        MealType::Dinner,
        MealType::DinnerSnack,
    ];
}

/// Weekday recurrence toggles, persisted as JSON on the order row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryOn {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl DeliveryOn {
    pub fn from_weekdays<I>(days: I) -> Self
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut on = Self::default();
        for day in days {
            on.enable(day);
        }
        on
    }

    pub fn enable(&mut self, day: Weekday) {
        match day {
            Weekday::Mon => self.monday = true,
            Weekday::Tue => self.tuesday = true,
            Weekday::Wed => self.wednesday = true,
            Weekday::Thu => self.thursday = true,
            Weekday::Fri => self.friday = true,
            Weekday::Sat => self.saturday = true,
            Weekday::Sun => self.sunday = true,
        }
    }

    pub fn allows(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.monday
            || self.tuesday
            || self.wednesday
            || self.thursday
            || self.friday
            || self.saturday
            || self.sunday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_round_trips_column_value() {
        assert_eq!(MealType::BreakfastSnack.to_string(), "breakfast_snack");
        assert_eq!(
            "breakfast_snack".parse::<MealType>().unwrap(),
            MealType::BreakfastSnack
        );
    }

    #[test]
    fn test_delivery_on_from_weekdays() {
        let on = DeliveryOn::from_weekdays([Weekday::Mon, Weekday::Fri]);
        assert!(on.allows(Weekday::Mon));
        assert!(on.allows(Weekday::Fri));
        assert!(!on.allows(Weekday::Tue));
        assert!(!on.is_empty());
        assert!(DeliveryOn::default().is_empty());
    }
}
