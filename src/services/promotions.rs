use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::{
    entities::product::{self, Entity as ProductEntity},
    entities::product_promotion::{self, Entity as ProductPromotionEntity},
    entities::promotion::{self, Entity as PromotionEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{pricing, BatchDeleteOutcome, ProductLocks},
};

/// Validity window of a product-promotion link. Must sit fully inside the
/// parent promotion's own window.
#[derive(Debug, Clone, Copy)]
pub struct DiscountWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Promotion manager: links products to promotion campaigns and enforces the
/// single-active-promotion-per-product invariant when toggling.
#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DatabaseConnection>,
    locks: ProductLocks,
    event_sender: Option<Arc<EventSender>>,
}

impl PromotionService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        locks: ProductLocks,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            locks,
            event_sender,
        }
    }

    /// Creates inactive links between the promotion and each product that is
    /// not already linked. Validation happens before any write.
    #[instrument(skip(self, product_ids), fields(promotion_id = promotion_id))]
    pub async fn link_products(
        &self,
        promotion_id: i32,
        product_ids: &[i32],
        discount: Decimal,
        window: DiscountWindow,
    ) -> Result<Vec<product_promotion::Model>, ServiceError> {
        let db = &*self.db;
        let campaign = self
            .checked_campaign(promotion_id, discount, window)
            .await?;
        self.require_products(product_ids).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;
        let mut created = Vec::new();

        for &product_id in product_ids {
            let existing = find_link(&txn, campaign.id, product_id).await?;
            if existing.is_some() {
                continue;
            }

            let link = product_promotion::ActiveModel {
                id: NotSet,
                product_id: Set(product_id),
                promotion_id: Set(campaign.id),
                discount: Set(discount),
                start_date: Set(window.start),
                end_date: Set(window.end),
                is_active: Set(false),
            }
            .insert(&txn)
            .await?;
            created.push(link);
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        info!(promotion_id, created = created.len(), "products linked to promotion");
        Ok(created)
    }

    /// Updates discount and window on existing links. Active links are
    /// immutable until deactivated; their product ids are returned as
    /// skipped, as are products with no link to this promotion.
    #[instrument(skip(self, product_ids), fields(promotion_id = promotion_id))]
    pub async fn update_links(
        &self,
        promotion_id: i32,
        product_ids: &[i32],
        discount: Decimal,
        window: DiscountWindow,
    ) -> Result<Vec<i32>, ServiceError> {
        let db = &*self.db;
        let campaign = self
            .checked_campaign(promotion_id, discount, window)
            .await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;
        let mut skipped = Vec::new();

        for &product_id in product_ids {
            let link = match find_link(&txn, campaign.id, product_id).await? {
                Some(link) => link,
                None => {
                    skipped.push(product_id);
                    continue;
                }
            };

            if link.is_active {
                warn!(product_id, promotion_id, "active link is immutable, skipped");
                skipped.push(product_id);
                continue;
            }

            let mut active: product_promotion::ActiveModel = link.into();
            active.discount = Set(discount);
            active.start_date = Set(window.start);
            active.end_date = Set(window.end);
            active.update(&txn).await?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        Ok(skipped)
    }

    /// Flips each product's link to this promotion, force-deactivating every
    /// other link on the product first so at most one stays active.
    ///
    /// Activation rewrites the product's cached price to the discounted
    /// snapshot price; deactivation restores the undiscounted snapshot price.
    /// Fails with `NotFound` when a product has never been priced. The whole
    /// call is one transaction under the products' locks: either every
    /// toggle commits or none does.
    #[instrument(skip(self, product_ids), fields(promotion_id = promotion_id))]
    pub async fn toggle_status(
        &self,
        promotion_id: i32,
        product_ids: &[i32],
    ) -> Result<Vec<product_promotion::Model>, ServiceError> {
        let db = &*self.db;
        PromotionEntity::find_by_id(promotion_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Promotion {} not found", promotion_id))
            })?;

        let _guards = self.locks.acquire_many(product_ids).await;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut toggled = Vec::new();
        for &product_id in product_ids {
            let link = find_link(&txn, promotion_id, product_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "no link between promotion {} and product {}",
                        promotion_id, product_id
                    ))
                })?;

            // A promotion cannot price a product that was never priced.
            let snapshot = pricing::latest_snapshot(&txn, product_id)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "no price snapshot for product {}",
                        product_id
                    ))
                })?;

            let siblings = ProductPromotionEntity::find()
                .filter(product_promotion::Column::ProductId.eq(product_id))
                .filter(product_promotion::Column::Id.ne(link.id))
                .filter(product_promotion::Column::IsActive.eq(true))
                .all(&txn)
                .await?;
            for sibling in siblings {
                let mut active: product_promotion::ActiveModel = sibling.into();
                active.is_active = Set(false);
                active.update(&txn).await?;
            }

            let now_active = !link.is_active;
            let discount = link.discount;
            let mut active: product_promotion::ActiveModel = link.into();
            active.is_active = Set(now_active);
            let updated = active.update(&txn).await?;

            let price = if now_active {
                snapshot.selling_price * (Decimal::ONE - discount)
            } else {
                snapshot.selling_price
            };

            let product = ProductEntity::find_by_id(product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", product_id))
                })?;
            let mut product_active: product::ActiveModel = product.into();
            product_active.price = Set(price);
            product_active.update(&txn).await?;

            toggled.push(updated);
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        for link in &toggled {
            info!(
                product_id = link.product_id,
                promotion_id,
                active = link.is_active,
                "promotion link toggled"
            );
            self.emit(Event::PromotionToggled {
                product_id: link.product_id,
                promotion_id,
                active: link.is_active,
            })
            .await;
        }

        Ok(toggled)
    }

    /// Best-effort delete of links. Active links and unknown ids are skipped
    /// silently and reported in the outcome.
    #[instrument(skip(self, ids))]
    pub async fn delete_links(&self, ids: &[i32]) -> Result<BatchDeleteOutcome, ServiceError> {
        let db = &*self.db;
        let mut outcome = BatchDeleteOutcome::default();

        for &id in ids {
            let link = ProductPromotionEntity::find_by_id(id).one(db).await?;
            match link {
                Some(link) if !link.is_active => {
                    ProductPromotionEntity::delete_by_id(id).exec(db).await?;
                    outcome.deleted.push(id);
                }
                Some(_) => {
                    warn!(link_id = id, "active link cannot be deleted, skipped");
                    outcome.skipped.push(id);
                }
                None => outcome.skipped.push(id),
            }
        }

        Ok(outcome)
    }

    /// Loads the campaign and runs all fail-fast validation shared by link
    /// creation and update.
    async fn checked_campaign(
        &self,
        promotion_id: i32,
        discount: Decimal,
        window: DiscountWindow,
    ) -> Result<promotion::Model, ServiceError> {
        let campaign = PromotionEntity::find_by_id(promotion_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Promotion {} not found", promotion_id))
            })?;

        validate_discount(discount)?;
        validate_window(window, &campaign)?;
        Ok(campaign)
    }

    async fn require_products(&self, product_ids: &[i32]) -> Result<(), ServiceError> {
        for &product_id in product_ids {
            ProductEntity::find_by_id(product_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", product_id))
                })?;
        }
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send promotion event");
            }
        }
    }
}

async fn find_link<C: sea_orm::ConnectionTrait>(
    conn: &C,
    promotion_id: i32,
    product_id: i32,
) -> Result<Option<product_promotion::Model>, ServiceError> {
    let link = ProductPromotionEntity::find()
        .filter(product_promotion::Column::PromotionId.eq(promotion_id))
        .filter(product_promotion::Column::ProductId.eq(product_id))
        .one(conn)
        .await?;
    Ok(link)
}

fn validate_discount(discount: Decimal) -> Result<(), ServiceError> {
    if discount <= Decimal::ZERO || discount >= Decimal::ONE {
        return Err(ServiceError::InvalidArgument(format!(
            "discount must be within (0, 1), got {}",
            discount
        )));
    }
    Ok(())
}

fn validate_window(window: DiscountWindow, campaign: &promotion::Model) -> Result<(), ServiceError> {
    if window.start > window.end {
        return Err(ServiceError::InvalidArgument(
            "window start must not be after window end".to_string(),
        ));
    }
    if window.start < campaign.start_date || window.end > campaign.end_date {
        return Err(ServiceError::InvalidArgument(format!(
            "window [{}, {}] exceeds promotion window [{}, {}]",
            window.start, window.end, campaign.start_date, campaign.end_date
        )));
    }
    Ok(())
}
