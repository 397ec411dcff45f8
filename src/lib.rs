//! gemstore-core
//!
//! Order-fulfillment and pricing core of a jewelry retail backend. The crate
//! owns the operations with real invariants: pricing snapshots, promotional
//! discounts, batch inventory allocation and the order delivery lifecycle.
//! Catalog CRUD, authentication and HTTP plumbing belong to the boundary
//! layer consuming it.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{
    inventory::InventoryService, orders::OrderService, pricing::PricingService,
    promotions::PromotionService, ProductLocks,
};

/// All core services wired over one connection pool and one per-product lock
/// registry. The boundary layer constructs this once and clones it freely.
#[derive(Clone)]
pub struct AppServices {
    pub db: Arc<DatabaseConnection>,
    pub pricing: PricingService,
    pub promotions: PromotionService,
    pub inventory: InventoryService,
    pub orders: OrderService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        let locks = ProductLocks::new();
        Self {
            pricing: PricingService::new(db.clone(), event_sender.clone()),
            promotions: PromotionService::new(db.clone(), locks.clone(), event_sender.clone()),
            inventory: InventoryService::new(db.clone(), locks.clone(), event_sender.clone()),
            orders: OrderService::new(db.clone(), locks, event_sender),
            db,
        }
    }
}
