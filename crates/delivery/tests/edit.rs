use delivery::commands::UpdateOrder;
use delivery::{DeliveryError, OrderService};

use crate::helpers::{bags_for_order, date, items_for_bag, mwf_lunch_order, setup_pool};

mod helpers;

fn lunch_update(count: i64) -> UpdateOrder {
    UpdateOrder {
        prefer_breakfast: false,
        breakfast_count: 0,
        prefer_breakfast_snack: false,
        breakfast_snack_count: 0,
        prefer_lunch: true,
        lunch_count: count,
        prefer_lunch_snack: false,
        lunch_snack_count: 0,
        prefer_dinner: false,
        dinner_count: 0,
        prefer_dinner_snack: false,
        dinner_snack_count: 0,
        remark: None,
        delivery_remark: None,
        address: Some("42 Rice Road".to_owned()),
    }
}

#[tokio::test]
async fn test_edit_rebuilds_only_future_bags() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let order = service.create_order(mwf_lunch_order(), "staff-1").await?;
    let before = bags_for_order(&pool, &order.id).await?;

    let today = date("2024-01-08");
    service
        .update_order(&order.id, lunch_update(3), "staff-1", today)
        .await?;

    let after = bags_for_order(&pool, &order.id).await?;
    assert_eq!(after.len(), before.len(), "dates are kept, not regenerated");

    for bag in &after {
        let was = before.iter().find(|b| b.delivery_at == bag.delivery_at);
        let items = items_for_bag(&pool, &bag.id).await?;
        if bag.delivery_at <= today {
            assert_eq!(
                Some(&bag.id),
                was.map(|b| &b.id),
                "past bag {} must be untouched",
                bag.delivery_at
            );
            assert_eq!(items.len(), 1);
        } else {
            assert_ne!(
                Some(&bag.id),
                was.map(|b| &b.id),
                "future bag {} must be recreated",
                bag.delivery_at
            );
            assert_eq!(items.len(), 3, "future bags reflect the new count");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_edit_rebuilds_from_remaining_future_dates() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let order = service.create_order(mwf_lunch_order(), "staff-1").await?;
    let bags = bags_for_order(&pool, &order.id).await?;
    let last = bags
        .iter()
        .find(|bag| bag.delivery_at == date("2024-01-12"))
        .expect("bag on 2024-01-12");

    // A manually removed delivery must not come back on edit; the rebuild
    // starts from the resolved dates that still exist.
    service.delete_bag(&last.id, "staff-1").await?;
    service
        .update_order(&order.id, lunch_update(2), "staff-1", date("2024-01-08"))
        .await?;

    let after = bags_for_order(&pool, &order.id).await?;
    let dates: Vec<_> = after.iter().map(|bag| bag.delivery_at).collect();
    assert!(!dates.contains(&date("2024-01-12")));
    assert_eq!(after.len(), 5);

    Ok(())
}

#[tokio::test]
async fn test_edit_with_remark_switches_future_to_individual_codes() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let order = service.create_order(mwf_lunch_order(), "staff-1").await?;

    let mut payload = lunch_update(1);
    payload.remark = Some("ring the bell twice".to_owned());
    service
        .update_order(&order.id, payload, "staff-1", date("2024-01-08"))
        .await?;

    for bag in bags_for_order(&pool, &order.id).await? {
        if bag.delivery_at > date("2024-01-08") {
            assert!(!bag.no_remark_type);
            let items = items_for_bag(&pool, &bag.id).await?;
            assert!(items.iter().all(|item| item.qrcode.is_none()));
        } else {
            assert!(bag.no_remark_type, "past bags keep their original flag");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_edit_unknown_order_is_not_found() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let err = service
        .update_order("missing", lunch_update(1), "staff-1", date("2024-01-08"))
        .await
        .expect_err("unknown order must fail");
    assert!(matches!(err, DeliveryError::NotFound { .. }));

    Ok(())
}
