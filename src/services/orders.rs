use std::sync::Arc;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::{
    entities::order::{self, Entity as OrderEntity, OrderStatus},
    entities::order_detail::{self, Entity as OrderDetailEntity},
    entities::product::Entity as ProductEntity,
    entities::user::{self, Entity as UserEntity},
    entities::voucher::{self, Entity as VoucherEntity, VoucherStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{inventory, ProductLocks},
};

/// One delivered order earns `payment / 10000` loyalty points, rounded
/// half-up.
const POINTS_DIVISOR: i64 = 10_000;

/// Order line as submitted by the boundary layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    /// Registered customer, or None for guest checkout.
    pub customer_id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 20, message = "Phone number is required"))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub voucher_id: Option<i32>,
    #[validate(length(min = 1, message = "An order needs at least one line"))]
    pub lines: Vec<OrderLine>,
}

/// Order lifecycle manager.
///
/// Every public operation is one transaction: order creation freezes unit
/// prices, redeems the voucher and depletes inventory together, and
/// cancellation restores all of it together.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    locks: ProductLocks,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
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

    /// Creates an order with its lines in one unit: validates the voucher,
    /// freezes each product's current selling price into the line, allocates
    /// inventory FIFO, and computes the discounted payment total.
    #[instrument(skip(self, request), fields(customer_id = ?request.customer_id, lines = request.lines.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        for line in &request.lines {
            if line.quantity <= 0 {
                return Err(ServiceError::InvalidArgument(format!(
                    "line quantity must be positive, got {} for product {}",
                    line.quantity, line.product_id
                )));
            }
        }

        let line_products: Vec<i32> = request.lines.iter().map(|l| l.product_id).collect();
        let _guards = self.locks.acquire_many(&line_products).await;

        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let mut email = request.email.clone();
        if let Some(customer_id) = request.customer_id {
            let customer = UserEntity::find_by_id(customer_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("User {} not found", customer_id))
                })?;
            email = Some(customer.email);
        }

        // The voucher is reserved optimistically: marked Used here, restored
        // only by cancellation.
        let voucher = match request.voucher_id {
            Some(voucher_id) => Some(redeem_voucher(&txn, voucher_id).await?),
            None => None,
        };

        let order = order::ActiveModel {
            id: NotSet,
            customer_id: Set(request.customer_id),
            customer_name: Set(request.customer_name.clone()),
            phone: Set(request.phone.clone()),
            email: Set(email),
            address: Set(request.address.clone()),
            status: Set(OrderStatus::Pending),
            payment_method: Set(request.payment_method.clone()),
            payment: Set(Decimal::ZERO),
            payment_status: Set(false),
            payment_date: Set(None),
            delivery_date: Set(None),
            delivery_staff_id: Set(None),
            voucher_id: Set(request.voucher_id),
            cancel_reason: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut total = Decimal::ZERO;
        for line in &request.lines {
            let product = ProductEntity::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", line.product_id))
                })?;

            // Frozen at order time, immune to later repricing.
            let unit_price = product.price;

            order_detail::ActiveModel {
                id: NotSet,
                order_id: Set(order.id),
                product_id: Set(line.product_id),
                quantity: Set(line.quantity),
                unit_price: Set(unit_price),
            }
            .insert(&txn)
            .await?;

            total += unit_price * Decimal::from(line.quantity);
            inventory::allocate_on(&txn, line.product_id, line.quantity).await?;
        }

        let payment = match &voucher {
            Some(voucher) => total * (Decimal::ONE - voucher.discount),
            None => total,
        };

        let mut active: order::ActiveModel = order.into();
        active.payment = Set(payment);
        let order = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = order.id, %payment, "order created");
        self.emit(Event::OrderCreated(order.id)).await;
        if let Some(voucher) = voucher {
            self.emit(Event::VoucherRedeemed(voucher.id)).await;
        }

        Ok(order)
    }

    /// Assigns delivery staff and moves the order to Processing. Overwriting
    /// an existing assignment is allowed; leaving a terminal state is not.
    #[instrument(skip(self), fields(order_id = order_id, staff_id = staff_id))]
    pub async fn assign_delivery(
        &self,
        order_id: i32,
        staff_id: i32,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order = find_order(&txn, order_id).await?;
        ensure_not_terminal(&order, "assign delivery staff")?;

        UserEntity::find_by_id(staff_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", staff_id)))?;

        let mut active: order::ActiveModel = order.into();
        active.delivery_staff_id = Set(Some(staff_id));
        active.status = Set(OrderStatus::Processing);
        let order = active.update(&txn).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(order_id, staff_id, "delivery assigned");
        self.emit(Event::DeliveryAssigned { order_id, staff_id }).await;
        Ok(order)
    }

    /// Generic status transition with the terminal-state guard.
    ///
    /// Target `Delivered` stamps the delivery date, completes COD payment and
    /// accrues loyalty points for registered customers. Target `Cancelled` is
    /// rejected here: cancellation has inventory and voucher side effects and
    /// must go through [`cancel_order`](Self::cancel_order).
    #[instrument(skip(self), fields(order_id = order_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        order_id: i32,
        new_status: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        if new_status == OrderStatus::Cancelled {
            return Err(ServiceError::InvalidTransition(
                "cancellation must go through cancel_order".to_string(),
            ));
        }

        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order = find_order(&txn, order_id).await?;
        ensure_not_terminal(&order, "update status")?;

        let old_status = order.status;
        let mut earned_points: Option<(i32, i32)> = None;

        let order = if new_status == OrderStatus::Delivered {
            let now = Utc::now();
            let cod = order.payment_method == "COD";
            let customer_id = order.customer_id;
            let payment = order.payment;

            let mut active: order::ActiveModel = order.into();
            active.status = Set(OrderStatus::Delivered);
            active.delivery_date = Set(Some(now));
            if cod {
                active.payment_date = Set(Some(now));
                active.payment_status = Set(true);
            }
            let updated = active.update(&txn).await?;

            if let Some(customer_id) = customer_id {
                let points = loyalty_points(payment);
                if points > 0 {
                    accrue_points(&txn, customer_id, points).await?;
                    earned_points = Some((customer_id, points));
                }
            }

            updated
        } else {
            let mut active: order::ActiveModel = order.into();
            active.status = Set(new_status);
            active.update(&txn).await?
        };

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(order_id, %old_status, %new_status, "order status updated");
        self.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status,
        })
        .await;
        if let Some((user_id, points)) = earned_points {
            self.emit(Event::LoyaltyPointsEarned { user_id, points }).await;
        }

        Ok(order)
    }

    /// Cancels the order: restocks every line and reactivates the voucher,
    /// all in one transaction. A second cancellation fails the terminal-state
    /// guard, so stock is never restored twice.
    #[instrument(skip(self), fields(order_id = order_id))]
    pub async fn cancel_order(
        &self,
        order_id: i32,
        reason: Option<String>,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db;

        // Lock every product on the order before opening the transaction;
        // details are re-read inside it.
        let details = OrderDetailEntity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .all(db)
            .await?;
        let line_products: Vec<i32> = details.iter().map(|d| d.product_id).collect();
        let _guards = self.locks.acquire_many(&line_products).await;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order = find_order(&txn, order_id).await?;
        ensure_not_terminal(&order, "cancel")?;

        let voucher_id = order.voucher_id;
        let mut active: order::ActiveModel = order.into();
        active.status = Set(OrderStatus::Cancelled);
        active.cancel_reason = Set(reason);
        let order = active.update(&txn).await?;

        let details = OrderDetailEntity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .all(&txn)
            .await?;
        for detail in &details {
            inventory::restock_latest_on(&txn, detail.product_id, detail.quantity).await?;
        }

        let reactivated_voucher = match voucher_id {
            Some(voucher_id) => {
                let voucher = VoucherEntity::find_by_id(voucher_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Voucher {} not found", voucher_id))
                    })?;
                let mut active: voucher::ActiveModel = voucher.into();
                active.status = Set(VoucherStatus::Active);
                active.update(&txn).await?;
                Some(voucher_id)
            }
            None => None,
        };

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id, "failed to commit order cancellation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id, lines = details.len(), "order cancelled");
        self.emit(Event::OrderCancelled(order_id)).await;
        for detail in &details {
            self.emit(Event::InventoryRestocked {
                product_id: detail.product_id,
                quantity: detail.quantity,
            })
            .await;
        }
        if let Some(voucher_id) = reactivated_voucher {
            self.emit(Event::VoucherReactivated(voucher_id)).await;
        }

        Ok(order)
    }

    /// Fetches a single order.
    pub async fn get_order(&self, order_id: i32) -> Result<Option<order::Model>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id).one(&*self.db).await?;
        Ok(order)
    }

    /// Order lines belonging to an order.
    pub async fn order_details(
        &self,
        order_id: i32,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        let details = OrderDetailEntity::find()
            .filter(order_detail::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;
        Ok(details)
    }

    /// Orders placed by a registered customer, newest first.
    pub async fn orders_for_customer(
        &self,
        customer_id: i32,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let orders = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(orders)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "failed to send order event");
            }
        }
    }
}

async fn find_order(
    txn: &DatabaseTransaction,
    order_id: i32,
) -> Result<order::Model, ServiceError> {
    OrderEntity::find_by_id(order_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

fn ensure_not_terminal(order: &order::Model, action: &str) -> Result<(), ServiceError> {
    if order.status.is_terminal() {
        return Err(ServiceError::InvalidTransition(format!(
            "cannot {} order {}: status {} is terminal",
            action, order.id, order.status
        )));
    }
    Ok(())
}

async fn redeem_voucher(
    txn: &DatabaseTransaction,
    voucher_id: i32,
) -> Result<voucher::Model, ServiceError> {
    let voucher = VoucherEntity::find_by_id(voucher_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Voucher {} not found", voucher_id)))?;

    if voucher.status != VoucherStatus::Active {
        return Err(ServiceError::InvalidArgument(format!(
            "voucher {} is not active",
            voucher_id
        )));
    }

    let mut active: voucher::ActiveModel = voucher.clone().into();
    active.status = Set(VoucherStatus::Used);
    active.update(txn).await?;

    Ok(voucher::Model {
        status: VoucherStatus::Used,
        ..voucher
    })
}

async fn accrue_points(
    txn: &DatabaseTransaction,
    user_id: i32,
    points: i32,
) -> Result<(), ServiceError> {
    let customer = UserEntity::find_by_id(user_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

    let balance = customer.point + points;
    let mut active: user::ActiveModel = customer.into();
    active.point = Set(balance);
    active.update(txn).await?;
    Ok(())
}

/// Points earned on delivery, rounded half-up like the storefront displays
/// them.
fn loyalty_points(payment: Decimal) -> i32 {
    (payment / Decimal::from(POINTS_DIVISOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), 0)]
    #[case(dec!(4999), 0)]
    #[case(dec!(5000), 1)]
    #[case(dec!(10000), 1)]
    #[case(dec!(14999), 1)]
    #[case(dec!(15000), 2)]
    #[case(dec!(225000), 23)]
    fn loyalty_points_round_half_up(#[case] payment: Decimal, #[case] expected: i32) {
        assert_eq!(loyalty_points(payment), expected);
    }

    #[test]
    fn terminal_guard_blocks_delivered_and_cancelled() {
        let base = order::Model {
            id: 1,
            customer_id: None,
            customer_name: "Guest".to_string(),
            phone: "0123".to_string(),
            email: None,
            address: "12 Main St".to_string(),
            status: OrderStatus::Delivered,
            payment_method: "COD".to_string(),
            payment: dec!(100),
            payment_status: false,
            payment_date: None,
            delivery_date: None,
            delivery_staff_id: None,
            voucher_id: None,
            cancel_reason: None,
            created_at: Utc::now(),
        };

        assert_matches!(
            ensure_not_terminal(&base, "cancel"),
            Err(ServiceError::InvalidTransition(_))
        );

        let cancelled = order::Model {
            status: OrderStatus::Cancelled,
            ..base.clone()
        };
        assert_matches!(
            ensure_not_terminal(&cancelled, "cancel"),
            Err(ServiceError::InvalidTransition(_))
        );

        let pending = order::Model {
            status: OrderStatus::Pending,
            ..base
        };
        assert!(ensure_not_terminal(&pending, "cancel").is_ok());
    }

    #[test]
    fn empty_line_list_fails_validation() {
        let request = CreateOrderRequest {
            customer_id: None,
            customer_name: "Guest".to_string(),
            phone: "0123456789".to_string(),
            email: None,
            address: "12 Main St".to_string(),
            payment_method: "COD".to_string(),
            voucher_id: None,
            lines: vec![],
        };
        assert!(request.validate().is_err());
    }
}
