use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::types::{DeliveryOn, MealType};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrder {
    #[validate(length(min = 1))]
    pub customer_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub delivery_on: DeliveryOn,
    pub prefer_breakfast: bool,
    #[validate(range(min = 0))]
    pub breakfast_count: i64,
    pub prefer_breakfast_snack: bool,
    #[validate(range(min = 0))]
    pub breakfast_snack_count: i64,
    pub prefer_lunch: bool,
    #[validate(range(min = 0))]
    pub lunch_count: i64,
    pub prefer_lunch_snack: bool,
    #[validate(range(min = 0))]
    pub lunch_snack_count: i64,
    pub prefer_dinner: bool,
    #[validate(range(min = 0))]
    pub dinner_count: i64,
    pub prefer_dinner_snack: bool,
    #[validate(range(min = 0))]
    pub dinner_snack_count: i64,
    pub remark: Option<String>,
    pub delivery_remark: Option<String>,
    pub address: Option<String>,
    pub delivery_time: Option<String>,
}

/// Editable subscription fields. The date range and recurrence are fixed at
/// creation; an edit reshapes the not-yet-delivered schedule only.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrder {
    pub prefer_breakfast: bool,
    #[validate(range(min = 0))]
    pub breakfast_count: i64,
    pub prefer_breakfast_snack: bool,
    #[validate(range(min = 0))]
    pub breakfast_snack_count: i64,
    pub prefer_lunch: bool,
    #[validate(range(min = 0))]
    pub lunch_count: i64,
    pub prefer_lunch_snack: bool,
    #[validate(range(min = 0))]
    pub lunch_snack_count: i64,
    pub prefer_dinner: bool,
    #[validate(range(min = 0))]
    pub dinner_count: i64,
    pub prefer_dinner_snack: bool,
    #[validate(range(min = 0))]
    pub dinner_snack_count: i64,
    pub remark: Option<String>,
    pub delivery_remark: Option<String>,
    pub address: Option<String>,
}

/// Per-meal-type target counts for a single bag.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBagData {
    pub address: Option<String>,
    #[validate(range(min = 0))]
    pub breakfast: i64,
    #[validate(range(min = 0))]
    pub breakfast_snack: i64,
    #[validate(range(min = 0))]
    pub lunch: i64,
    #[validate(range(min = 0))]
    pub lunch_snack: i64,
    #[validate(range(min = 0))]
    pub dinner: i64,
    #[validate(range(min = 0))]
    pub dinner_snack: i64,
}

impl UpdateBagData {
    pub fn targets(&self) -> [(MealType, i64); 6] {
        [
            (MealType::Breakfast, self.breakfast),
            (MealType::BreakfastSnack, self.breakfast_snack),
            (MealType::Lunch, self.lunch),
            (MealType::LunchSnack, self.lunch_snack),
            (MealType::Dinner, self.dinner),
            (MealType::DinnerSnack, self.dinner_snack),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasketAssignment {
    pub id: String,
    pub basket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOrderItem {
    pub bag_code: String,
    pub order_item_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyBag {
    pub bag_code: String,
    pub basket: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListOrders {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// With `end_date`, keeps orders whose date range overlaps the window.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListBags {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    pub customer_id: Option<String>,
}
