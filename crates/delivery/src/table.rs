use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Orders {
    Table,
    Id,
    CustomerId,
    Address,
    Remark,
    DeliveryRemark,
    DeliveryTime,
    StartDate,
    EndDate,
    DeliveryOn,
    PreferBreakfast,
    BreakfastCount,
    PreferBreakfastSnack,
    BreakfastSnackCount,
    PreferLunch,
    LunchCount,
    PreferLunchSnack,
    LunchSnackCount,
    PreferDinner,
    DinnerCount,
    PreferDinnerSnack,
    DinnerSnackCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum Bags {
    Table,
    Id,
    OrderId,
    DeliveryAt,
    NoRemarkType,
    Address,
    QrCode,
    Basket,
    InBasketStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone)]
pub enum OrderItems {
    Table,
    Id,
    OrderId,
    BagId,
    DeliveryAt,
    MealType,
    Qrcode,
    InBagStatus,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum Logs {
    Table,
    Id,
    UserId,
    CustomerId,
    BagId,
    Type,
    Detail,
    Status,
    CreatedAt,
}
