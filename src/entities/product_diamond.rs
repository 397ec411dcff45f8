use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Component link: how many of a given diamond a product contains.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_diamonds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub diamond_id: i32,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::diamond::Entity",
        from = "Column::DiamondId",
        to = "super::diamond::Column::Id"
    )]
    Diamond,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::diamond::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Diamond.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
