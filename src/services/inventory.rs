use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};

use crate::{
    entities::inventory::{self, Entity as InventoryEntity},
    entities::product::Entity as ProductEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::ProductLocks,
};

/// Inventory allocator: tracks available stock per product across purchase
/// batches and serializes every mutation per product.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    locks: ProductLocks,
    event_sender: Option<Arc<EventSender>>,
}

impl InventoryService {
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

    /// Depletes available batches oldest-first until `quantity` is satisfied.
    ///
    /// Fails with `InsufficientStock` before touching any batch when total
    /// available stock cannot cover the request.
    #[instrument(skip(self), fields(product_id = product_id, quantity = quantity))]
    pub async fn allocate(&self, product_id: i32, quantity: i32) -> Result<(), ServiceError> {
        let _guard = self.locks.acquire(product_id).await;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;
        allocate_on(&txn, product_id, quantity).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(product_id, quantity, "inventory allocated");
        self.emit(Event::InventoryAllocated {
            product_id,
            quantity,
        })
        .await;
        Ok(())
    }

    /// Returns `quantity` units to the most recently created batch.
    #[instrument(skip(self), fields(product_id = product_id, quantity = quantity))]
    pub async fn restock(&self, product_id: i32, quantity: i32) -> Result<(), ServiceError> {
        let _guard = self.locks.acquire(product_id).await;

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;
        restock_latest_on(&txn, product_id, quantity).await?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(product_id, quantity, "inventory restocked");
        self.emit(Event::InventoryRestocked {
            product_id,
            quantity,
        })
        .await;
        Ok(())
    }

    /// Total available stock for a product. Pure read.
    pub async fn available_quantity(&self, product_id: i32) -> Result<i32, ServiceError> {
        available_quantity_on(&*self.db, product_id).await
    }

    /// Records a new physical batch. The only way stock enters the system.
    #[instrument(skip(self), fields(product_id = product_id, quantity = quantity))]
    pub async fn receive_batch(
        &self,
        product_id: i32,
        quantity: i32,
        purchase_date: DateTime<Utc>,
    ) -> Result<inventory::Model, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "batch quantity must be positive, got {}",
                quantity
            )));
        }

        let db = &*self.db;
        ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let batch = inventory::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            quantity: Set(quantity),
            available: Set(true),
            purchase_date: Set(purchase_date),
        }
        .insert(db)
        .await?;

        info!(product_id, quantity, batch_id = batch.id, "batch received");
        self.emit(Event::BatchReceived {
            product_id,
            quantity,
        })
        .await;
        Ok(batch)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send inventory event");
            }
        }
    }
}

/// FIFO allocation against a caller-supplied connection, so order creation
/// can deplete stock inside its own transaction.
pub(crate) async fn allocate_on<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "allocation quantity must be positive, got {}",
            quantity
        )));
    }

    let batches = InventoryEntity::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .filter(inventory::Column::Available.eq(true))
        .order_by_asc(inventory::Column::PurchaseDate)
        .order_by_asc(inventory::Column::Id)
        .all(conn)
        .await?;

    let total: i64 = batches.iter().map(|b| i64::from(b.quantity)).sum();
    if total < i64::from(quantity) {
        return Err(ServiceError::InsufficientStock(format!(
            "product {}: requested {}, available {}",
            product_id, quantity, total
        )));
    }

    let mut remaining = quantity;
    for batch in batches {
        if remaining == 0 {
            break;
        }
        let take = batch.quantity.min(remaining);
        if take == 0 {
            continue;
        }

        let new_quantity = batch.quantity - take;
        let mut active: inventory::ActiveModel = batch.into();
        active.quantity = Set(new_quantity);
        active.update(conn).await?;

        remaining -= take;
    }

    Ok(())
}

/// Restock into the most recently created batch ("top"). This does not
/// reverse the FIFO allocation batch-for-batch; the aggregate quantity is
/// restored but batch provenance is an approximation.
pub(crate) async fn restock_latest_on<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidArgument(format!(
            "restock quantity must be positive, got {}",
            quantity
        )));
    }

    let batch = InventoryEntity::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .order_by_desc(inventory::Column::Id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("no inventory batch for product {}", product_id))
        })?;

    let new_quantity = batch.quantity + quantity;
    let mut active: inventory::ActiveModel = batch.into();
    active.quantity = Set(new_quantity);
    active.update(conn).await?;

    Ok(())
}

pub(crate) async fn available_quantity_on<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
) -> Result<i32, ServiceError> {
    let batches = InventoryEntity::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .filter(inventory::Column::Available.eq(true))
        .all(conn)
        .await?;

    Ok(batches.iter().map(|b| b.quantity).sum())
}
