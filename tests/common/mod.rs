//! Shared harness for integration tests: a fresh SQLite database per test,
//! migrated schema, and seed helpers for catalog and stock fixtures.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, NotSet, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

use gemstore_core::entities::{
    diamond, inventory, mount, product, product_diamond, promotion, user, voucher,
};
use gemstore_core::entities::voucher::VoucherStatus;
use gemstore_core::migrator::Migrator;
use gemstore_core::AppServices;

pub struct TestApp {
    pub services: AppServices,
    pub db: Arc<sea_orm::DatabaseConnection>,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = dir.path().join("gemstore_test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let mut options = ConnectOptions::new(url);
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("failed to create test database");
        Migrator::up(&db, None).await.expect("failed to run migrations");

        let db = Arc::new(db);
        let services = AppServices::new(db.clone(), None);
        Self {
            services,
            db,
            _dir: dir,
        }
    }

    pub async fn seed_user(&self, full_name: &str, email: &str, point: i32) -> user::Model {
        user::ActiveModel {
            id: NotSet,
            full_name: Set(full_name.to_string()),
            email: Set(email.to_string()),
            point: Set(point),
            role: Set("customer".to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed user")
    }

    pub async fn seed_diamond(&self, name: &str, base_price: Decimal) -> diamond::Model {
        diamond::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            base_price: Set(base_price),
            status: Set("available".to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed diamond")
    }

    pub async fn seed_mount(&self, name: &str, base_price: Decimal) -> mount::Model {
        mount::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            mount_type: Set("ring".to_string()),
            base_price: Set(base_price),
            status: Set("available".to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed mount")
    }

    /// Seeds a product with an already-cached selling price, as if it had
    /// been priced before.
    pub async fn seed_product(
        &self,
        name: &str,
        mount_id: Option<i32>,
        labor_fee: Decimal,
        price: Decimal,
    ) -> product::Model {
        product::ActiveModel {
            id: NotSet,
            product_name: Set(name.to_string()),
            description: Set(None),
            mount_id: Set(mount_id),
            labor_fee: Set(labor_fee),
            components_price: Set(Decimal::ZERO),
            price: Set(price),
            status: Set("selling".to_string()),
        }
        .insert(&*self.db)
        .await
        .expect("seed product")
    }

    pub async fn seed_product_diamond(
        &self,
        product_id: i32,
        diamond_id: i32,
        quantity: i32,
    ) -> product_diamond::Model {
        product_diamond::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            diamond_id: Set(diamond_id),
            quantity: Set(quantity),
        }
        .insert(&*self.db)
        .await
        .expect("seed product diamond")
    }

    /// Seeds an inventory batch purchased `age_days` days ago, so tests can
    /// control FIFO order.
    pub async fn seed_batch(&self, product_id: i32, quantity: i32, age_days: i64) -> inventory::Model {
        self.seed_batch_at(product_id, quantity, Utc::now() - Duration::days(age_days))
            .await
    }

    pub async fn seed_batch_at(
        &self,
        product_id: i32,
        quantity: i32,
        purchase_date: DateTime<Utc>,
    ) -> inventory::Model {
        inventory::ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            quantity: Set(quantity),
            available: Set(true),
            purchase_date: Set(purchase_date),
        }
        .insert(&*self.db)
        .await
        .expect("seed inventory batch")
    }

    pub async fn seed_voucher(&self, code: &str, discount: Decimal) -> voucher::Model {
        voucher::ActiveModel {
            id: NotSet,
            code: Set(code.to_string()),
            discount: Set(discount),
            status: Set(VoucherStatus::Active),
        }
        .insert(&*self.db)
        .await
        .expect("seed voucher")
    }

    /// Seeds a promotion campaign spanning `days` days starting now.
    pub async fn seed_promotion(&self, name: &str, days: i64) -> promotion::Model {
        let start = Utc::now();
        promotion::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(None),
            start_date: Set(start),
            end_date: Set(start + Duration::days(days)),
        }
        .insert(&*self.db)
        .await
        .expect("seed promotion")
    }
}
