//! Pricing engine and promotion manager behavior against a real schema:
//! component-cost derivation, snapshot history, effective-price rewrites and
//! the single-active-promotion invariant.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

use gemstore_core::entities::{product, product_promotion};
use gemstore_core::errors::ServiceError;
use gemstore_core::services::promotions::DiscountWindow;

async fn reload_product(app: &TestApp, id: i32) -> product::Model {
    product::Entity::find_by_id(id)
        .one(&*app.db)
        .await
        .unwrap()
        .expect("product exists")
}

fn window_within(campaign: &gemstore_core::entities::promotion::Model) -> DiscountWindow {
    DiscountWindow {
        start: campaign.start_date,
        end: campaign.end_date,
    }
}

#[tokio::test]
async fn component_cost_sums_diamonds_and_mount() {
    let app = TestApp::new().await;

    let mount = app.seed_mount("classic band", dec!(30)).await;
    let product = app
        .seed_product("solitaire", Some(mount.id), dec!(20), dec!(0))
        .await;
    let stone_a = app.seed_diamond("round 1ct", dec!(100)).await;
    let stone_b = app.seed_diamond("accent", dec!(50)).await;
    app.seed_product_diamond(product.id, stone_a.id, 2).await;
    app.seed_product_diamond(product.id, stone_b.id, 1).await;

    let cost = app
        .services
        .pricing
        .compute_component_cost(product.id)
        .await
        .unwrap();
    assert_eq!(cost, dec!(280)); // 2×100 + 50 + 30

    // Deterministic and persisted onto the cached field.
    let again = app
        .services
        .pricing
        .compute_component_cost(product.id)
        .await
        .unwrap();
    assert_eq!(again, cost);
    assert_eq!(reload_product(&app, product.id).await.components_price, cost);
}

#[tokio::test]
async fn component_cost_unknown_product_not_found() {
    let app = TestApp::new().await;
    assert_matches!(
        app.services.pricing.compute_component_cost(404).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn set_price_snapshots_and_updates_cache() {
    let app = TestApp::new().await;

    let mount = app.seed_mount("band", dec!(50)).await;
    let product = app
        .seed_product("ring", Some(mount.id), dec!(20), dec!(0))
        .await;
    let stone = app.seed_diamond("stone", dec!(100)).await;
    app.seed_product_diamond(product.id, stone.id, 2).await;
    app.services
        .pricing
        .compute_component_cost(product.id)
        .await
        .unwrap();

    let snapshot = app
        .services
        .pricing
        .set_price(product.id, dec!(1.5))
        .await
        .unwrap();

    assert_eq!(snapshot.cost_price, dec!(270)); // 250 components + 20 labor
    assert_eq!(snapshot.selling_price, dec!(405));
    assert_eq!(reload_product(&app, product.id).await.price, dec!(405));

    let history = app.services.pricing.price_history(product.id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn set_price_rejects_nonpositive_markup() {
    let app = TestApp::new().await;
    let product = app.seed_product("ring", None, dec!(10), dec!(0)).await;

    assert_matches!(
        app.services.pricing.set_price(product.id, dec!(0)).await,
        Err(ServiceError::InvalidArgument(_))
    );
}

#[tokio::test]
async fn refresh_is_noop_without_snapshot_or_change() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(20), dec!(0)).await;
    let stone = app.seed_diamond("stone", dec!(100)).await;
    app.seed_product_diamond(product.id, stone.id, 1).await;

    // Never priced: nothing to refresh.
    let refreshed = app
        .services
        .pricing
        .refresh_price_if_cost_changed(product.id)
        .await
        .unwrap();
    assert!(refreshed.is_none());

    app.services
        .pricing
        .compute_component_cost(product.id)
        .await
        .unwrap();
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap();

    // Cost unchanged: still a no-op.
    let refreshed = app
        .services
        .pricing
        .refresh_price_if_cost_changed(product.id)
        .await
        .unwrap();
    assert!(refreshed.is_none());
    assert_eq!(
        app.services.pricing.price_history(product.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn refresh_reprices_with_same_markup_when_cost_changes() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(20), dec!(0)).await;
    let stone = app.seed_diamond("stone", dec!(100)).await;
    let link = app.seed_product_diamond(product.id, stone.id, 1).await;
    app.services
        .pricing
        .compute_component_cost(product.id)
        .await
        .unwrap();
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap();

    // Double the stone count, then invoke the explicit repricing hook.
    use sea_orm::{ActiveModelTrait, Set};
    let mut active: gemstore_core::entities::product_diamond::ActiveModel = link.into();
    active.quantity = Set(2);
    active.update(&*app.db).await.unwrap();

    let snapshot = app
        .services
        .pricing
        .refresh_price_if_cost_changed(product.id)
        .await
        .unwrap()
        .expect("cost changed, expected a new snapshot");

    assert_eq!(snapshot.cost_price, dec!(220)); // 200 components + 20 labor
    assert_eq!(snapshot.markup_rate, dec!(2));
    assert_eq!(snapshot.selling_price, dec!(440));
    assert_eq!(reload_product(&app, product.id).await.price, dec!(440));
}

#[tokio::test]
async fn delete_price_snapshots_reports_skipped_ids() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(10), dec!(0)).await;
    let snapshot = app.services.pricing.set_price(product.id, dec!(2)).await.unwrap();

    let outcome = app
        .services
        .pricing
        .delete_price_snapshots(&[snapshot.id, 9999])
        .await
        .unwrap();

    assert_eq!(outcome.deleted, vec![snapshot.id]);
    assert_eq!(outcome.skipped, vec![9999]);
    assert!(!outcome.all_deleted());
}

#[tokio::test]
async fn toggle_discounts_and_restores_effective_price() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap(); // selling 100

    let campaign = app.seed_promotion("summer", 30).await;
    app.services
        .promotions
        .link_products(campaign.id, &[product.id], dec!(0.2), window_within(&campaign))
        .await
        .unwrap();

    let toggled = app
        .services
        .promotions
        .toggle_status(campaign.id, &[product.id])
        .await
        .unwrap();
    assert!(toggled[0].is_active);
    assert_eq!(reload_product(&app, product.id).await.price, dec!(80));

    let toggled = app
        .services
        .promotions
        .toggle_status(campaign.id, &[product.id])
        .await
        .unwrap();
    assert!(!toggled[0].is_active);
    assert_eq!(reload_product(&app, product.id).await.price, dec!(100));
}

#[tokio::test]
async fn activating_one_promotion_deactivates_siblings() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap();

    let summer = app.seed_promotion("summer", 30).await;
    let winter = app.seed_promotion("winter", 30).await;
    app.services
        .promotions
        .link_products(summer.id, &[product.id], dec!(0.2), window_within(&summer))
        .await
        .unwrap();
    app.services
        .promotions
        .link_products(winter.id, &[product.id], dec!(0.3), window_within(&winter))
        .await
        .unwrap();

    app.services
        .promotions
        .toggle_status(summer.id, &[product.id])
        .await
        .unwrap();
    app.services
        .promotions
        .toggle_status(winter.id, &[product.id])
        .await
        .unwrap();

    let links = product_promotion::Entity::find().all(&*app.db).await.unwrap();
    let active: Vec<_> = links.iter().filter(|l| l.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].promotion_id, winter.id);

    // Winter's 0.3 discount applies.
    assert_eq!(reload_product(&app, product.id).await.price, dec!(70));
}

#[tokio::test]
async fn concurrent_toggles_leave_at_most_one_active() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap(); // selling 100

    let summer = app.seed_promotion("summer", 30).await;
    let winter = app.seed_promotion("winter", 30).await;
    app.services
        .promotions
        .link_products(summer.id, &[product.id], dec!(0.2), window_within(&summer))
        .await
        .unwrap();
    app.services
        .promotions
        .link_products(winter.id, &[product.id], dec!(0.3), window_within(&winter))
        .await
        .unwrap();

    let a = {
        let promotions = app.services.promotions.clone();
        let (promotion_id, product_id) = (summer.id, product.id);
        tokio::spawn(async move { promotions.toggle_status(promotion_id, &[product_id]).await })
    };
    let b = {
        let promotions = app.services.promotions.clone();
        let (promotion_id, product_id) = (winter.id, product.id);
        tokio::spawn(async move { promotions.toggle_status(promotion_id, &[product_id]).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let links = product_promotion::Entity::find().all(&*app.db).await.unwrap();
    let active: Vec<_> = links.iter().filter(|l| l.is_active).collect();
    assert!(active.len() <= 1, "at most one link may stay active");

    // The cached price agrees with whichever link won.
    let expected = match active.first() {
        Some(link) if link.promotion_id == summer.id => dec!(80),
        Some(_) => dec!(70),
        None => dec!(100),
    };
    assert_eq!(reload_product(&app, product.id).await.price, expected);
}

#[tokio::test]
async fn toggle_requires_price_snapshot() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    let campaign = app.seed_promotion("summer", 30).await;
    app.services
        .promotions
        .link_products(campaign.id, &[product.id], dec!(0.2), window_within(&campaign))
        .await
        .unwrap();

    assert_matches!(
        app.services
            .promotions
            .toggle_status(campaign.id, &[product.id])
            .await,
        Err(ServiceError::NotFound(_))
    );

    // The failed toggle must not leave the link active.
    let links = product_promotion::Entity::find().all(&*app.db).await.unwrap();
    assert!(links.iter().all(|l| !l.is_active));
}

#[tokio::test]
async fn link_validation_fails_before_any_write() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    let campaign = app.seed_promotion("summer", 30).await;

    assert_matches!(
        app.services
            .promotions
            .link_products(campaign.id, &[product.id], dec!(1.2), window_within(&campaign))
            .await,
        Err(ServiceError::InvalidArgument(_))
    );

    let outside = DiscountWindow {
        start: campaign.start_date,
        end: campaign.end_date + Duration::days(5),
    };
    assert_matches!(
        app.services
            .promotions
            .link_products(campaign.id, &[product.id], dec!(0.2), outside)
            .await,
        Err(ServiceError::InvalidArgument(_))
    );

    assert_matches!(
        app.services
            .promotions
            .link_products(campaign.id, &[404], dec!(0.2), window_within(&campaign))
            .await,
        Err(ServiceError::NotFound(_))
    );

    assert!(product_promotion::Entity::find()
        .all(&*app.db)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn active_links_are_immutable_and_undeletable() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    app.services.pricing.set_price(product.id, dec!(2)).await.unwrap();

    let campaign = app.seed_promotion("summer", 30).await;
    let links = app
        .services
        .promotions
        .link_products(campaign.id, &[product.id], dec!(0.2), window_within(&campaign))
        .await
        .unwrap();
    app.services
        .promotions
        .toggle_status(campaign.id, &[product.id])
        .await
        .unwrap();

    let skipped = app
        .services
        .promotions
        .update_links(campaign.id, &[product.id], dec!(0.4), window_within(&campaign))
        .await
        .unwrap();
    assert_eq!(skipped, vec![product.id]);

    let outcome = app
        .services
        .promotions
        .delete_links(&[links[0].id])
        .await
        .unwrap();
    assert!(outcome.deleted.is_empty());
    assert_eq!(outcome.skipped, vec![links[0].id]);

    // Deactivate, then both update and delete go through.
    app.services
        .promotions
        .toggle_status(campaign.id, &[product.id])
        .await
        .unwrap();
    let skipped = app
        .services
        .promotions
        .update_links(campaign.id, &[product.id], dec!(0.4), window_within(&campaign))
        .await
        .unwrap();
    assert!(skipped.is_empty());

    let outcome = app
        .services
        .promotions
        .delete_links(&[links[0].id])
        .await
        .unwrap();
    assert_eq!(outcome.deleted, vec![links[0].id]);
}

#[tokio::test]
async fn linking_twice_is_idempotent() {
    let app = TestApp::new().await;

    let product = app.seed_product("ring", None, dec!(50), dec!(0)).await;
    let campaign = app.seed_promotion("summer", 30).await;

    let first = app
        .services
        .promotions
        .link_products(campaign.id, &[product.id], dec!(0.2), window_within(&campaign))
        .await
        .unwrap();
    assert_eq!(first.len(), 1);

    let second = app
        .services
        .promotions
        .link_products(campaign.id, &[product.id], dec!(0.2), window_within(&campaign))
        .await
        .unwrap();
    assert!(second.is_empty());
}
