use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "diamonds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub base_price: Decimal,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_diamond::Entity")]
    ProductDiamonds,
}

impl Related<super::product_diamond::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductDiamonds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
