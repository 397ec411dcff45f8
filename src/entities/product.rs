use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product assembled from a mount and zero-or-more diamonds.
///
/// `components_price` and `price` are derived caches: the first is rewritten
/// by the pricing engine's component-cost computation, the second only by
/// pricing snapshots and promotion toggles. Nothing else may mutate them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub mount_id: Option<i32>,
    pub labor_fee: Decimal,
    pub components_price: Decimal,
    /// Current effective selling price.
    pub price: Decimal,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mount::Entity",
        from = "Column::MountId",
        to = "super::mount::Column::Id"
    )]
    Mount,
    #[sea_orm(has_many = "super::product_diamond::Entity")]
    ProductDiamonds,
    #[sea_orm(has_many = "super::product_price::Entity")]
    ProductPrices,
    #[sea_orm(has_many = "super::product_promotion::Entity")]
    ProductPromotions,
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventory,
    #[sea_orm(has_many = "super::order_detail::Entity")]
    OrderDetails,
}

impl Related<super::mount::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mount.def()
    }
}

impl Related<super::product_diamond::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductDiamonds.def()
    }
}

impl Related<super::product_price::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductPrices.def()
    }
}

impl Related<super::product_promotion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductPromotions.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
