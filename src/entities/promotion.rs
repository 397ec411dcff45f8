use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parent promotion campaign. Product links must fit inside its window.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_promotion::Entity")]
    ProductPromotions,
}

impl Related<super::product_promotion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductPromotions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
