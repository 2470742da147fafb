use chrono::Weekday;
use delivery::commands::{BasketAssignment, VerifyBag, VerifyOrderItem};
use delivery::types::DeliveryOn;
use delivery::{DeliveryError, OrderService};

use crate::helpers::{bags_for_order, date, items_for_bag, mwf_lunch_order, setup_pool};

mod helpers;

/// No-remark order whose Mon+Tue bags form one scan group.
async fn paired_order(
    service: &OrderService,
    pool: &sqlx::SqlitePool,
) -> anyhow::Result<Vec<delivery::BagRow>> {
    let mut payload = mwf_lunch_order();
    payload.delivery_on = DeliveryOn::from_weekdays([Weekday::Mon, Weekday::Tue]);
    payload.end_date = date("2024-01-02");
    let order = service.create_order(payload, "staff-1").await?;
    Ok(bags_for_order(pool, &order.id).await?)
}

#[tokio::test]
async fn test_verify_item_marks_in_bag_and_is_idempotent() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let bags = paired_order(&service, &pool).await?;
    let item = &items_for_bag(&pool, &bags[0].id).await?[0];

    for _ in 0..2 {
        service
            .verify_order_item(
                VerifyOrderItem {
                    bag_code: bags[0].qr_code.clone(),
                    order_item_id: item.id.clone(),
                },
                "checker-1",
            )
            .await?;

        let after = &items_for_bag(&pool, &bags[0].id).await?[0];
        assert_eq!(after.in_bag_status, Some(true));
    }

    Ok(())
}

#[tokio::test]
async fn test_verify_item_in_wrong_group_marks_false() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let bags = paired_order(&service, &pool).await?;
    let item = &items_for_bag(&pool, &bags[0].id).await?[0];

    // A second subscription supplies a code from a different group.
    let other = service.create_order(mwf_lunch_order(), "staff-1").await?;
    let other_bags = bags_for_order(&pool, &other.id).await?;

    let err = service
        .verify_order_item(
            VerifyOrderItem {
                bag_code: other_bags[0].qr_code.clone(),
                order_item_id: item.id.clone(),
            },
            "checker-1",
        )
        .await
        .expect_err("item does not belong to the scanned group");
    assert!(matches!(err, DeliveryError::NotFound { .. }));

    let after = &items_for_bag(&pool, &bags[0].id).await?[0];
    assert_eq!(after.in_bag_status, Some(false));

    // Re-verifying with the right code overwrites the flag.
    service
        .verify_order_item(
            VerifyOrderItem {
                bag_code: bags[0].qr_code.clone(),
                order_item_id: item.id.clone(),
            },
            "checker-1",
        )
        .await?;
    let after = &items_for_bag(&pool, &bags[0].id).await?[0];
    assert_eq!(after.in_bag_status, Some(true));

    Ok(())
}

#[tokio::test]
async fn test_verify_item_unknown_code_is_not_found() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let bags = paired_order(&service, &pool).await?;
    let item = &items_for_bag(&pool, &bags[0].id).await?[0];

    let err = service
        .verify_order_item(
            VerifyOrderItem {
                bag_code: "no-such-code".to_owned(),
                order_item_id: item.id.clone(),
            },
            "checker-1",
        )
        .await
        .expect_err("unknown bag code must fail");
    assert!(matches!(err, DeliveryError::NotFound { .. }));

    // The item itself stays unverified.
    let after = &items_for_bag(&pool, &bags[0].id).await?[0];
    assert_eq!(after.in_bag_status, None);

    Ok(())
}

#[tokio::test]
async fn test_verify_bag_match_marks_whole_group() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let bags = paired_order(&service, &pool).await?;
    assert_eq!(bags[0].qr_code, bags[1].qr_code);

    // Labels are stored whitespace-stripped.
    service
        .update_basket(&[
            BasketAssignment {
                id: bags[0].id.clone(),
                basket: "B 9".to_owned(),
            },
            BasketAssignment {
                id: bags[1].id.clone(),
                basket: "B9".to_owned(),
            },
        ])
        .await?;

    service
        .verify_bag(
            VerifyBag {
                bag_code: bags[0].qr_code.clone(),
                basket: "B9".to_owned(),
            },
            "checker-1",
        )
        .await?;

    for bag in bags_for_order(&pool, &bags[0].order_id).await? {
        assert_eq!(bag.in_basket_status, Some(true));
        assert_eq!(bag.basket.as_deref(), Some("B9"));
    }

    Ok(())
}

#[tokio::test]
async fn test_verify_bag_mismatch_marks_group_false() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let bags = paired_order(&service, &pool).await?;
    service
        .update_basket(&[
            BasketAssignment {
                id: bags[0].id.clone(),
                basket: "B-9".to_owned(),
            },
            BasketAssignment {
                id: bags[1].id.clone(),
                basket: "B-9".to_owned(),
            },
        ])
        .await?;

    let err = service
        .verify_bag(
            VerifyBag {
                bag_code: bags[0].qr_code.clone(),
                basket: "B-7".to_owned(),
            },
            "checker-1",
        )
        .await
        .expect_err("wrong basket must be a mismatch");
    assert!(matches!(err, DeliveryError::ScanMismatch));

    for bag in bags_for_order(&pool, &bags[0].order_id).await? {
        assert_eq!(bag.in_basket_status, Some(false));
    }

    // A later correct scan re-evaluates and overwrites.
    service
        .verify_bag(
            VerifyBag {
                bag_code: bags[0].qr_code.clone(),
                basket: "B-9".to_owned(),
            },
            "checker-1",
        )
        .await?;
    for bag in bags_for_order(&pool, &bags[0].order_id).await? {
        assert_eq!(bag.in_basket_status, Some(true));
    }

    Ok(())
}

#[tokio::test]
async fn test_verify_bag_unknown_code_is_not_found() -> anyhow::Result<()> {
    let (_dir, pool) = setup_pool().await?;
    let service = OrderService::new(pool.clone());

    let err = service
        .verify_bag(
            VerifyBag {
                bag_code: "no-such-code".to_owned(),
                basket: "B-1".to_owned(),
            },
            "checker-1",
        )
        .await
        .expect_err("unknown bag code must fail");
    assert!(matches!(err, DeliveryError::NotFound { .. }));

    Ok(())
}
