use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{error, info, instrument, warn};

use crate::{
    entities::mount,
    entities::product::{self, Entity as ProductEntity},
    entities::product_diamond::{self, Entity as ProductDiamondEntity},
    entities::product_price::{self, Entity as ProductPriceEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::BatchDeleteOutcome,
};

/// Pricing engine: derives a product's cost basis from its components and
/// maintains the append-only snapshot history behind the cached selling
/// price.
#[derive(Clone)]
pub struct PricingService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl PricingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Sums diamond base prices (weighted by link quantity) plus the mount
    /// base price, and persists the result onto the product's cached
    /// component-cost field. Idempotent: repeated calls with unchanged
    /// components rewrite the same value.
    #[instrument(skip(self), fields(product_id = product_id))]
    pub async fn compute_component_cost(&self, product_id: i32) -> Result<Decimal, ServiceError> {
        let db = &*self.db;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut cost = Decimal::ZERO;

        let components = ProductDiamondEntity::find()
            .filter(product_diamond::Column::ProductId.eq(product_id))
            .find_also_related(crate::entities::diamond::Entity)
            .all(db)
            .await?;

        for (link, stone) in components {
            if let Some(stone) = stone {
                cost += stone.base_price * Decimal::from(link.quantity);
            }
        }

        if let Some(mount_id) = product.mount_id {
            if let Some(mount) = mount::Entity::find_by_id(mount_id).one(db).await? {
                cost += mount.base_price;
            }
        }

        let mut active: product::ActiveModel = product.into();
        active.components_price = Set(cost);
        active.update(db).await?;

        Ok(cost)
    }

    /// Creates a new pricing snapshot from the current cost basis and updates
    /// the product's cached selling price.
    #[instrument(skip(self), fields(product_id = product_id, markup_rate = %markup_rate))]
    pub async fn set_price(
        &self,
        product_id: i32,
        markup_rate: Decimal,
    ) -> Result<product_price::Model, ServiceError> {
        if markup_rate <= Decimal::ZERO {
            return Err(ServiceError::InvalidArgument(format!(
                "markup rate must be positive, got {}",
                markup_rate
            )));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "failed to start transaction for price snapshot");
            ServiceError::DatabaseError(e)
        })?;

        let product = ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let cost_price = product.components_price + product.labor_fee;
        let selling_price = cost_price * markup_rate;

        let snapshot = product_price::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            cost_price: Set(cost_price),
            markup_rate: Set(markup_rate),
            selling_price: Set(selling_price),
            update_date: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut active: product::ActiveModel = product.into();
        active.price = Set(selling_price);
        active.update(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(product_id, %selling_price, "price snapshot created");
        self.emit(Event::PriceUpdated {
            product_id,
            selling_price,
        })
        .await;

        Ok(snapshot)
    }

    /// Recomputes the cost basis and, when it differs from the latest
    /// snapshot, re-prices the product with the same markup rate. This is the
    /// explicit repricing hook called after any cost-affecting edit to a
    /// product's diamonds or mount. No-op when the product was never priced
    /// or the cost is unchanged.
    #[instrument(skip(self), fields(product_id = product_id))]
    pub async fn refresh_price_if_cost_changed(
        &self,
        product_id: i32,
    ) -> Result<Option<product_price::Model>, ServiceError> {
        let components_price = self.compute_component_cost(product_id).await?;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let product = ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let Some(last) = latest_snapshot(&txn, product_id).await? else {
            txn.commit().await.map_err(ServiceError::DatabaseError)?;
            return Ok(None);
        };

        let cost_price = components_price + product.labor_fee;
        if cost_price == last.cost_price {
            txn.commit().await.map_err(ServiceError::DatabaseError)?;
            return Ok(None);
        }

        let selling_price = cost_price * last.markup_rate;
        let snapshot = product_price::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            cost_price: Set(cost_price),
            markup_rate: Set(last.markup_rate),
            selling_price: Set(selling_price),
            update_date: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let mut active: product::ActiveModel = product.into();
        active.price = Set(selling_price);
        active.update(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(product_id, old_cost = %last.cost_price, new_cost = %cost_price, "cost basis changed, product re-priced");
        self.emit(Event::PriceUpdated {
            product_id,
            selling_price,
        })
        .await;

        Ok(Some(snapshot))
    }

    /// Best-effort batch delete of historical snapshots. Unknown ids are
    /// skipped and reported; already-deleted entries stay deleted.
    #[instrument(skip(self, ids))]
    pub async fn delete_price_snapshots(
        &self,
        ids: &[i32],
    ) -> Result<BatchDeleteOutcome, ServiceError> {
        let db = &*self.db;
        let mut outcome = BatchDeleteOutcome::default();

        for &id in ids {
            let result = ProductPriceEntity::delete_by_id(id).exec(db).await?;
            if result.rows_affected == 0 {
                warn!(snapshot_id = id, "price snapshot not found, skipped");
                outcome.skipped.push(id);
            } else {
                outcome.deleted.push(id);
            }
        }

        Ok(outcome)
    }

    /// Append-only pricing history for a product, newest first.
    pub async fn price_history(
        &self,
        product_id: i32,
    ) -> Result<Vec<product_price::Model>, ServiceError> {
        let db = &*self.db;
        let history = ProductPriceEntity::find()
            .filter(product_price::Column::ProductId.eq(product_id))
            .order_by_desc(product_price::Column::UpdateDate)
            .order_by_desc(product_price::Column::Id)
            .all(db)
            .await?;
        Ok(history)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send pricing event");
            }
        }
    }
}

/// Most recent snapshot for a product, the authoritative cost/markup basis.
pub(crate) async fn latest_snapshot<C: sea_orm::ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<Option<product_price::Model>, ServiceError> {
    let snapshot = ProductPriceEntity::find()
        .filter(product_price::Column::ProductId.eq(product_id))
        .order_by_desc(product_price::Column::UpdateDate)
        .order_by_desc(product_price::Column::Id)
        .one(conn)
        .await?;
    Ok(snapshot)
}
