pub mod audit;
pub mod calendar;
pub mod commands;
pub mod error;
pub mod grouping;
pub mod holiday;
pub mod qr;
pub mod read_model;
pub mod service;
pub mod table;
pub mod types;

pub use audit::{ListLogs, LogEntry, LogRow, LogStatus, LogType, Recorder, list_logs};
pub use commands::{
    BasketAssignment, CreateOrder, ListBags, ListOrders, UpdateBagData, UpdateOrder, VerifyBag,
    VerifyOrderItem,
};
pub use error::{DeliveryError, Result};
pub use holiday::HolidayStore;
pub use read_model::{
    BagGroupView, BagRow, BagWithItems, DeliveryQueries, MealTypeTotal, OrderItemRow, OrderRow,
};
pub use service::OrderService;
pub use types::{DeliveryOn, MealType};

/// Embedded schema migrations for the delivery store.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
