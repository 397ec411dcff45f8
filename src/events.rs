use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::entities::order::OrderStatus;

/// Events emitted by the services after a successful commit.
///
/// Delivery is fire-and-forget: a full or closed channel is logged by the
/// caller and never fails the originating operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(i32),
    OrderStatusChanged {
        order_id: i32,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCancelled(i32),
    DeliveryAssigned {
        order_id: i32,
        staff_id: i32,
    },

    InventoryAllocated {
        product_id: i32,
        quantity: i32,
    },
    InventoryRestocked {
        product_id: i32,
        quantity: i32,
    },
    BatchReceived {
        product_id: i32,
        quantity: i32,
    },

    PriceUpdated {
        product_id: i32,
        selling_price: Decimal,
    },
    PromotionToggled {
        product_id: i32,
        promotion_id: i32,
        active: bool,
    },

    VoucherRedeemed(i32),
    VoucherReactivated(i32),
    LoyaltyPointsEarned {
        user_id: i32,
        points: i32,
    },
}

impl Event {
    /// JSON payload for downstream consumers (outbox rows, log drains).
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates an event channel with the given buffer size.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains events to the log. Useful as a default consumer when the caller has
/// no interest in individual events.
pub fn spawn_event_logger(mut receiver: mpsc::Receiver<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            info!(payload = %event.payload(), "event received");
        }
    })
}
